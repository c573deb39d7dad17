use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::Currency;

/// Provider-specific symbol parameters.
/// Produced by the translator, consumed by providers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderSymbol {
    /// Plain ticker in the provider's vocabulary (Yahoo: "^GSPC", AV: "SPY")
    Equity { symbol: Arc<str> },

    /// Crypto as separate base/market (AlphaVantage)
    CryptoPair { symbol: Arc<str>, market: Currency },

    /// FX as from/to pair (AlphaVantage)
    FxPair { from: Currency, to: Currency },

    /// CoinGecko coin id quoted against a vs-currency ("bitcoin"/"usd")
    CoinId { id: Arc<str>, vs_currency: Currency },

    /// Exchange-coded regional symbol (Eastmoney: "105.AAPL")
    Regional { code: Arc<str> },

    /// Macro series identifier (FRED: "DGS10")
    Series { id: Arc<str> },

    /// Page path for scrape-based sources (Google Finance: "VIX:INDEXCBOE")
    Page { path: Arc<str> },
}

impl ProviderSymbol {
    pub fn equity(symbol: impl Into<Arc<str>>) -> Self {
        Self::Equity {
            symbol: symbol.into(),
        }
    }

    pub fn regional(code: impl Into<Arc<str>>) -> Self {
        Self::Regional { code: code.into() }
    }
}

impl fmt::Display for ProviderSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equity { symbol } => write!(f, "{}", symbol),
            Self::CryptoPair { symbol, market } => write!(f, "{}/{}", symbol, market),
            Self::FxPair { from, to } => write!(f, "{}{}", from, to),
            Self::CoinId { id, vs_currency } => write!(f, "{}:{}", id, vs_currency),
            Self::Regional { code } => write!(f, "{}", code),
            Self::Series { id } => write!(f, "{}", id),
            Self::Page { path } => write!(f, "{}", path),
        }
    }
}
