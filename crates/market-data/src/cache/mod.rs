//! In-memory session cache.
//!
//! Three maps, all write-once:
//! - [`SingleKey`] → one ticker's frame
//! - [`BatchKey`] → a multi-ticker table
//! - ticker → [`TickerInfo`]
//!
//! Windows are compared for exact equality only. Only the ticker dimension
//! may be served from a superset entry.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::debug;

use crate::models::{CanonicalFrame, PriceTable, RequestWindow, Ticker, TickerInfo};

/// Cache key for one ticker over one window.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SingleKey {
    pub ticker: Ticker,
    pub window: RequestWindow,
}

impl SingleKey {
    pub fn new(ticker: impl Into<Ticker>, window: RequestWindow) -> Self {
        Self {
            ticker: ticker.into(),
            window,
        }
    }
}

/// Cache key for a ticker set over one window.
///
/// Tickers are sorted and deduplicated on construction, so input order never
/// changes the slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BatchKey {
    tickers: Vec<Ticker>,
    window: RequestWindow,
}

impl BatchKey {
    pub fn new<I, T>(tickers: I, window: RequestWindow) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Ticker>,
    {
        let set: BTreeSet<Ticker> = tickers.into_iter().map(Into::into).collect();
        Self {
            tickers: set.into_iter().collect(),
            window,
        }
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn window(&self) -> &RequestWindow {
        &self.window
    }

    /// True when every ticker in `requested` is part of this key.
    fn covers(&self, requested: &[Ticker]) -> bool {
        requested
            .iter()
            .all(|t| self.tickers.binary_search(t).is_ok())
    }
}

/// Session cache store.
#[derive(Debug, Default)]
pub struct CacheStore {
    single: HashMap<SingleKey, CanonicalFrame>,
    batch: HashMap<BatchKey, PriceTable>,
    info: HashMap<Ticker, Arc<TickerInfo>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact batch lookup.
    pub fn get_exact(&self, key: &BatchKey) -> Option<&PriceTable> {
        self.batch.get(key)
    }

    /// Serve `requested` from any batch entry with the same window whose
    /// ticker set is a superset. The result is projected to `requested`.
    pub fn get_subset(&self, requested: &[Ticker], window: &RequestWindow) -> Option<PriceTable> {
        if requested.is_empty() {
            return None;
        }
        self.batch
            .iter()
            .filter(|(key, _)| key.window == *window && key.covers(requested))
            .map(|(key, table)| (key, table.project(requested)))
            .find(|(_, projected)| projected.len() == requested.len())
            .map(|(key, projected)| {
                debug!(
                    "Subset cache hit: {} of {} tickers from batch {:?}",
                    projected.len(),
                    key.tickers.len(),
                    key.tickers
                );
                projected
            })
    }

    /// Single-ticker lookup.
    pub fn get_single(&self, ticker: &str, window: &RequestWindow) -> Option<&CanonicalFrame> {
        self.single.get(&SingleKey::new(ticker, window.clone()))
    }

    /// Store a batch and a single-ticker projection for each of its frames.
    ///
    /// Entries are immutable. Writing an existing key is a no-op and returns
    /// `false`.
    pub fn put(&mut self, key: BatchKey, table: &PriceTable) -> bool {
        for (ticker, frame) in table.iter() {
            self.put_single(SingleKey::new(ticker.clone(), key.window.clone()), frame);
        }
        match self.batch.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(table.clone());
                true
            }
        }
    }

    /// Store one ticker's frame. Existing entries are kept.
    pub fn put_single(&mut self, key: SingleKey, frame: &CanonicalFrame) -> bool {
        match self.single.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(frame.clone());
                true
            }
        }
    }

    /// Longest daily frame cached for `ticker` under any period.
    pub fn daily_frame(&self, ticker: &str) -> Option<&CanonicalFrame> {
        self.single
            .iter()
            .filter(|(key, _)| key.ticker.as_ref() == ticker && key.window.is_daily())
            .map(|(_, frame)| frame)
            .max_by_key(|frame| frame.len())
    }

    pub fn get_info(&self, ticker: &str) -> Option<Arc<TickerInfo>> {
        self.info.get(ticker).cloned()
    }

    /// Store info for a ticker. Existing entries are kept.
    pub fn put_info(&mut self, info: TickerInfo) -> Arc<TickerInfo> {
        self.info
            .entry(Ticker::from(info.symbol.as_str()))
            .or_insert_with(|| Arc::new(info))
            .clone()
    }

    pub fn single_len(&self) -> usize {
        self.single.len()
    }

    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    pub fn info_len(&self) -> usize {
        self.info.len()
    }

    pub fn clear(&mut self) {
        self.single.clear();
        self.batch.clear();
        self.info.clear();
    }
}
