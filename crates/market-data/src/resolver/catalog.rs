//! JSON-driven symbol catalog.
//!
//! Loads `symbols.json` at compile time via `include_str!` and parses it once
//! via `lazy_static`. Every static vocabulary table used by the translator
//! and the sanity validator lives in that file.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::error;
use serde::Deserialize;

// ── JSON schema ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SymbolCatalog {
    /// Index → ETF proxy. `null` means the index has no proxy.
    #[serde(default)]
    pub index_proxies: HashMap<String, Option<String>>,
    /// Canonical crypto ticker → Alpha Vantage digital currency code
    #[serde(default)]
    pub crypto_pairs: HashMap<String, String>,
    /// Canonical FX ticker → (from, to)
    #[serde(default)]
    pub fx_pairs: HashMap<String, (String, String)>,
    /// Canonical ticker → Eastmoney secid
    #[serde(default)]
    pub eastmoney: HashMap<String, String>,
    /// Exchange prefixes tried in order for tickers missing from `eastmoney`
    #[serde(default)]
    pub eastmoney_probe_prefixes: Vec<String>,
    /// Canonical ticker → (coin id, vs currency)
    #[serde(default)]
    pub coingecko: HashMap<String, (String, String)>,
    /// Canonical index → Google Finance quote path
    #[serde(default)]
    pub google_finance: HashMap<String, String>,
    /// Yield index → FRED series id
    #[serde(default)]
    pub fred_series: HashMap<String, String>,
    /// Display names for price-derived info
    #[serde(default)]
    pub names: HashMap<String, String>,
    /// Expected (low, high) trading range per ticker
    #[serde(default)]
    pub price_bounds: HashMap<String, (f64, f64)>,
}

lazy_static! {
    pub(crate) static ref CATALOG: SymbolCatalog = SymbolCatalog::load();
}

impl SymbolCatalog {
    fn load() -> Self {
        let json = include_str!("symbols.json");
        serde_json::from_str(json).unwrap_or_else(|e| {
            error!("symbols.json is invalid, translator tables are empty: {}", e);
            SymbolCatalog::default()
        })
    }
}

/// Display name for a canonical ticker, if known.
pub fn display_name(ticker: &str) -> Option<&'static str> {
    CATALOG.names.get(ticker).map(String::as_str)
}

/// Expected (low, high) trading range for a canonical ticker, if known.
pub fn price_bounds(ticker: &str) -> Option<(f64, f64)> {
    CATALOG.price_bounds.get(ticker).copied()
}
