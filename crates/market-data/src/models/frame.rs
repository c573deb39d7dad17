use std::collections::BTreeMap;

use chrono::NaiveDate;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::ProviderId;

/// One daily OHLCV row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Build a bar from floating point fields.
    ///
    /// Returns `None` if any field is NaN or infinite, so non-finite values
    /// never reach a frame.
    pub fn from_f64(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Option<Self> {
        Some(Self {
            date,
            open: finite_decimal(open)?,
            high: finite_decimal(high)?,
            low: finite_decimal(low)?,
            close: finite_decimal(close)?,
            volume: finite_decimal(volume)?,
        })
    }

    /// A flat bar where every price equals `value`.
    ///
    /// Only for sources with no volume concept at all (macro series, quote
    /// page scrapes), where zero volume is the true value.
    pub fn flat(date: NaiveDate, value: Decimal) -> Self {
        Self::new(date, value, value, value, value, Decimal::ZERO)
    }
}

/// Convert a float to `Decimal`, rejecting NaN and infinities.
pub fn finite_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

/// Canonical OHLCV series for one ticker.
///
/// Rows are sorted ascending by date with at most one row per date. Missing
/// dates are absent rather than filled. A frame always has at least one row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFrame {
    source: ProviderId,
    rows: Vec<Bar>,
}

impl CanonicalFrame {
    /// Build a frame from unordered rows.
    ///
    /// Duplicate dates keep the row that appears last in the input.
    /// Returns `None` when there are no rows.
    pub fn from_rows(source: ProviderId, rows: impl IntoIterator<Item = Bar>) -> Option<Self> {
        let by_date: BTreeMap<NaiveDate, Bar> = rows.into_iter().map(|bar| (bar.date, bar)).collect();
        if by_date.is_empty() {
            return None;
        }
        Some(Self {
            source,
            rows: by_date.into_values().collect(),
        })
    }

    /// Provider that produced this frame.
    pub fn source(&self) -> &ProviderId {
        &self.source
    }

    pub fn rows(&self) -> &[Bar] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.rows.last()
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.rows.iter().map(|bar| bar.close).collect()
    }

    pub fn volumes(&self) -> Vec<Decimal> {
        self.rows.iter().map(|bar| bar.volume).collect()
    }

    /// Keep only the most recent `n` rows. `n == 0` keeps everything.
    pub fn tail(mut self, n: usize) -> Self {
        if n > 0 && self.rows.len() > n {
            self.rows.drain(..self.rows.len() - n);
        }
        self
    }

    /// Drop rows that fail `keep`. Returns `None` if nothing is left.
    pub fn retain(mut self, keep: impl FnMut(&Bar) -> bool) -> Option<Self> {
        self.rows.retain(keep);
        if self.rows.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
