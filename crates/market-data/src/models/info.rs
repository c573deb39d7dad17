use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a [`TickerInfo`] came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoSource {
    /// Fundamentals endpoint of a provider (e.g. "ALPHA_VANTAGE", "YAHOO")
    Provider(String),
    /// Derived from a cached or freshly fetched daily price frame
    PriceFrame,
    /// Price-derived info enriched with scraped ratios
    PriceFrameEnriched,
}

/// Descriptive and fundamental attributes for one ticker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub symbol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<InfoSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_pe: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_pe: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub peg_ratio: Option<f64>,

    /// Return on equity as a fraction (0.25 for 25%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_on_equity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margins: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_margins: Option<f64>,

    /// Debt to equity in percent (150.0 for a ratio of 1.5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,

    /// Dividend yield as a fraction (0.025 for 2.5%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_52_high: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_52_low: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,

    /// Day change in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
}

impl TickerInfo {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Attribute map view, omitting absent values.
    pub fn to_attributes(&self) -> BTreeMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Number of populated attributes besides the symbol and source.
    pub fn attribute_count(&self) -> usize {
        self.to_attributes()
            .keys()
            .filter(|k| k.as_str() != "symbol" && k.as_str() != "source")
            .count()
    }

    pub fn has_price(&self) -> bool {
        self.current_price.is_some()
    }

    pub fn has_fundamentals(&self) -> bool {
        self.return_on_equity.is_some() || self.forward_pe.is_some()
    }

    /// Fill empty fundamentals from `other` without touching existing values.
    pub fn merge_fundamentals(&mut self, other: &TickerInfo) {
        self.return_on_equity = self.return_on_equity.or(other.return_on_equity);
        self.forward_pe = self.forward_pe.or(other.forward_pe);
        self.trailing_pe = self.trailing_pe.or(other.trailing_pe);
        self.debt_to_equity = self.debt_to_equity.or(other.debt_to_equity);
        self.profit_margins = self.profit_margins.or(other.profit_margins);
    }
}
