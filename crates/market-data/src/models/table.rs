use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::frame::{Bar, CanonicalFrame};
use super::types::Ticker;

/// Price column used when merging frames into a panel.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    fn pick(self, bar: &Bar) -> Decimal {
        match self {
            Self::Open => bar.open,
            Self::High => bar.high,
            Self::Low => bar.low,
            Self::Close => bar.close,
            Self::Volume => bar.volume,
        }
    }
}

/// Result of a price request: one frame per ticker that resolved.
///
/// A ticker that no tier could serve is simply absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    frames: BTreeMap<Ticker, CanonicalFrame>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: Ticker, frame: CanonicalFrame) {
        self.frames.insert(ticker, frame);
    }

    pub fn get(&self, ticker: &str) -> Option<&CanonicalFrame> {
        self.frames.get(ticker)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.frames.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.frames.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Ticker, CanonicalFrame> {
        self.frames.iter()
    }

    /// Merge another table in. Existing tickers are kept.
    pub fn extend(&mut self, other: PriceTable) {
        for (ticker, frame) in other.frames {
            self.frames.entry(ticker).or_insert(frame);
        }
    }

    /// Restrict the table to the given tickers.
    pub fn project<'a>(&self, tickers: impl IntoIterator<Item = &'a Ticker>) -> PriceTable {
        let frames = tickers
            .into_iter()
            .filter_map(|t| self.frames.get(t).map(|f| (t.clone(), f.clone())))
            .collect();
        PriceTable { frames }
    }

    /// Close prices for one ticker, oldest first.
    pub fn closes(&self, ticker: &str) -> Option<Vec<Decimal>> {
        self.get(ticker).map(CanonicalFrame::closes)
    }

    /// Volumes for one ticker, oldest first.
    pub fn volumes(&self, ticker: &str) -> Option<Vec<Decimal>> {
        self.get(ticker).map(CanonicalFrame::volumes)
    }

    /// Merge every frame into a date -> ticker -> value table.
    ///
    /// Dates missing for a ticker are absent in that ticker's column.
    pub fn panel(&self, field: PriceField) -> BTreeMap<NaiveDate, BTreeMap<Ticker, Decimal>> {
        let mut panel: BTreeMap<NaiveDate, BTreeMap<Ticker, Decimal>> = BTreeMap::new();
        for (ticker, frame) in &self.frames {
            for bar in frame.rows() {
                panel
                    .entry(bar.date)
                    .or_default()
                    .insert(ticker.clone(), field.pick(bar));
            }
        }
        panel
    }
}

impl IntoIterator for PriceTable {
    type Item = (Ticker, CanonicalFrame);
    type IntoIter = btree_map::IntoIter<Ticker, CanonicalFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl FromIterator<(Ticker, CanonicalFrame)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (Ticker, CanonicalFrame)>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}
