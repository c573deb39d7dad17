//! Symbol translator.
//!
//! Maps a canonical ticker to each provider's native vocabulary. Rules are
//! deterministic lookups over the symbol catalog plus a small amount of
//! shape-based classification (`^` indices, `-USD` crypto, `=X` FX).

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::models::ProviderSymbol;
use crate::provider::{alpha_vantage, coingecko, eastmoney, fred, google_finance, stock_analysis, yahoo};

use super::catalog::CATALOG;

/// Prefix marking a macro series ticker ("FRED:DGS10").
pub const MACRO_PREFIX: &str = "FRED:";

/// Result of translating one ticker for one provider.
///
/// `NoMapping` is a normal outcome. It means the provider has no equivalent
/// symbol and the tier is skipped without counting as a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolMapping {
    /// A single known provider symbol.
    Symbol(ProviderSymbol),
    /// Candidates to try in order. The first that returns data is remembered.
    Probe(Vec<ProviderSymbol>),
    /// The provider has no equivalent for this ticker.
    NoMapping,
}

impl SymbolMapping {
    pub fn is_no_mapping(&self) -> bool {
        matches!(self, SymbolMapping::NoMapping)
    }
}

impl From<Option<ProviderSymbol>> for SymbolMapping {
    fn from(symbol: Option<ProviderSymbol>) -> Self {
        symbol.map_or(SymbolMapping::NoMapping, SymbolMapping::Symbol)
    }
}

/// Coarse shape of a canonical ticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TickerClass<'a> {
    Macro(&'a str),
    Index,
    Crypto,
    Fx,
    Future,
    Equity,
}

fn classify(ticker: &str) -> TickerClass<'_> {
    if let Some(series) = ticker.strip_prefix(MACRO_PREFIX) {
        TickerClass::Macro(series)
    } else if ticker.starts_with('^') {
        TickerClass::Index
    } else if ticker.ends_with("=X") {
        TickerClass::Fx
    } else if ticker.ends_with("=F") {
        TickerClass::Future
    } else if ticker.ends_with("-USD") {
        TickerClass::Crypto
    } else {
        TickerClass::Equity
    }
}

/// ETF proxy for an index. `None` when the index has no proxy.
fn index_proxy(ticker: &str) -> Option<&'static str> {
    CATALOG
        .index_proxies
        .get(ticker)
        .and_then(|proxy| proxy.as_deref())
}

/// Translates canonical tickers into provider symbols.
///
/// Holds the probe memo, so one translator belongs to one session.
#[derive(Debug, Default)]
pub struct SymbolTranslator {
    overrides: HashMap<(String, String), SymbolMapping>,
    probed: HashMap<(String, String), ProviderSymbol>,
}

impl SymbolTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the mapping for one (provider, ticker) pair.
    pub fn with_override(mut self, provider: &str, ticker: &str, mapping: SymbolMapping) -> Self {
        self.overrides
            .insert((provider.to_string(), ticker.to_string()), mapping);
        self
    }

    /// Translate `ticker` for `provider`. Never fails.
    pub fn translate(&self, provider: &str, ticker: &str) -> SymbolMapping {
        let key = (provider.to_string(), ticker.to_string());
        if let Some(mapping) = self.overrides.get(&key) {
            return mapping.clone();
        }
        if let Some(symbol) = self.probed.get(&key) {
            return SymbolMapping::Symbol(symbol.clone());
        }

        match provider {
            alpha_vantage::PROVIDER_ID => Self::alpha_vantage(ticker).into(),
            yahoo::PROVIDER_ID => Self::yahoo(ticker).into(),
            fred::PROVIDER_ID => Self::fred(ticker).into(),
            eastmoney::PROVIDER_ID => Self::eastmoney(ticker),
            coingecko::PROVIDER_ID => Self::coingecko(ticker).into(),
            google_finance::PROVIDER_ID => Self::google_finance(ticker).into(),
            stock_analysis::PROVIDER_ID => Self::stock_analysis(ticker).into(),
            _ => SymbolMapping::Symbol(ProviderSymbol::equity(ticker)),
        }
    }

    /// Remember the probe candidate that returned data.
    pub fn remember_probe(&mut self, provider: &str, ticker: &str, symbol: ProviderSymbol) {
        debug!("Probe for {} on {} resolved to {}", ticker, provider, symbol);
        self.probed
            .insert((provider.to_string(), ticker.to_string()), symbol);
    }

    /// Forget every probe result. Overrides are kept.
    pub fn clear_probes(&mut self) {
        self.probed.clear();
    }

    fn alpha_vantage(ticker: &str) -> Option<ProviderSymbol> {
        match classify(ticker) {
            TickerClass::Macro(_) | TickerClass::Future => None,
            TickerClass::Index => index_proxy(ticker).map(ProviderSymbol::equity),
            TickerClass::Crypto => {
                let code = CATALOG.crypto_pairs.get(ticker)?;
                Some(ProviderSymbol::CryptoPair {
                    symbol: Arc::from(code.as_str()),
                    market: Cow::Borrowed("USD"),
                })
            }
            TickerClass::Fx => {
                if let Some((from, to)) = CATALOG.fx_pairs.get(ticker) {
                    return Some(ProviderSymbol::FxPair {
                        from: Cow::Owned(from.clone()),
                        to: Cow::Owned(to.clone()),
                    });
                }
                // "EURUSD=X" → EUR/USD
                let pair = ticker.trim_end_matches("=X");
                if pair.len() == 6 && pair.chars().all(|c| c.is_ascii_alphabetic()) {
                    Some(ProviderSymbol::FxPair {
                        from: Cow::Owned(pair[..3].to_uppercase()),
                        to: Cow::Owned(pair[3..].to_uppercase()),
                    })
                } else {
                    None
                }
            }
            TickerClass::Equity => Some(ProviderSymbol::equity(ticker)),
        }
    }

    fn yahoo(ticker: &str) -> Option<ProviderSymbol> {
        match classify(ticker) {
            TickerClass::Macro(_) => None,
            _ => Some(ProviderSymbol::equity(ticker)),
        }
    }

    fn fred(ticker: &str) -> Option<ProviderSymbol> {
        let id = match classify(ticker) {
            TickerClass::Macro(series) if !series.is_empty() => series,
            TickerClass::Index => CATALOG.fred_series.get(ticker)?.as_str(),
            _ => return None,
        };
        Some(ProviderSymbol::Series { id: Arc::from(id) })
    }

    fn eastmoney(ticker: &str) -> SymbolMapping {
        let equity = match classify(ticker) {
            TickerClass::Index => match index_proxy(ticker) {
                Some(proxy) => proxy,
                None => return SymbolMapping::NoMapping,
            },
            TickerClass::Equity => ticker,
            _ => return SymbolMapping::NoMapping,
        };

        if let Some(code) = CATALOG.eastmoney.get(equity) {
            return SymbolMapping::Symbol(ProviderSymbol::regional(code.as_str()));
        }

        let local = equity.replace('-', "_");
        SymbolMapping::Probe(
            CATALOG
                .eastmoney_probe_prefixes
                .iter()
                .map(|prefix| ProviderSymbol::regional(format!("{}.{}", prefix, local)))
                .collect(),
        )
    }

    fn coingecko(ticker: &str) -> Option<ProviderSymbol> {
        let (id, vs) = CATALOG.coingecko.get(ticker)?;
        Some(ProviderSymbol::CoinId {
            id: Arc::from(id.as_str()),
            vs_currency: Cow::Owned(vs.clone()),
        })
    }

    fn google_finance(ticker: &str) -> Option<ProviderSymbol> {
        let path = CATALOG.google_finance.get(ticker)?;
        Some(ProviderSymbol::Page {
            path: Arc::from(path.as_str()),
        })
    }

    fn stock_analysis(ticker: &str) -> Option<ProviderSymbol> {
        match classify(ticker) {
            // BRK-B is listed as brk.b
            TickerClass::Equity => Some(ProviderSymbol::Page {
                path: Arc::from(ticker.to_lowercase().replace('-', ".")),
            }),
            _ => None,
        }
    }
}
