//! Named ticker groups for warming the cache at the start of a run.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadGroup {
    pub name: String,
    pub tickers: Vec<String>,
}

impl PreloadGroup {
    pub fn new<I, T>(name: impl Into<String>, tickers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            tickers: tickers.into_iter().map(Into::into).collect(),
        }
    }

    /// Groups most reports read from.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "indices",
                [
                    "^GSPC", "^IXIC", "^DJI", "^VIX", "^VIX9D", "^HSI", "^HSTECH", "^RUT",
                    "^N225", "^FTSE", "^GDAXI", "^STOXX50E",
                ],
            ),
            Self::new("crypto", ["BTC-USD", "ETH-USD"]),
            Self::new(
                "macro_bonds",
                ["TLT", "IEF", "SHY", "HYG", "LQD", "UUP", "FXY", "GLD"],
            ),
            Self::new("commodities", ["USO", "SLV", "GDX", "CPER", "DBA", "PDBC"]),
            Self::new("credit", ["BKLN", "KRE"]),
            Self::new("china_etf", ["KWEB", "FXI", "MCHI", "EWH", "CNY=X"]),
            Self::new("market_etf", ["SPY", "QQQ"]),
        ]
    }

    /// Look up one of the default groups by name.
    pub fn named(name: &str) -> Option<Self> {
        Self::defaults().into_iter().find(|g| g.name == name)
    }
}
