//! Property-based tests for cache keys, cache writes and frame invariants.
//!
//! These tests verify that universal properties hold across generated inputs,
//! using the `proptest` crate for random test case generation.

use std::borrow::Cow;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use reportdesk_market_data::normalizer::normalize;
use reportdesk_market_data::{
    Bar, BatchKey, CacheStore, CanonicalFrame, PayloadShape, PriceTable, RawPayload,
    RequestWindow, Ticker,
};

// =============================================================================
// Generators
// =============================================================================

/// Generates a small ticker universe member.
fn arb_ticker() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("AAPL".to_string()),
        Just("MSFT".to_string()),
        Just("^GSPC".to_string()),
        Just("BTC-USD".to_string()),
        "[A-Z]{1,5}",
    ]
}

/// Generates a ticker list, possibly with duplicates.
fn arb_tickers() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_ticker(), 1..8)
}

/// Generates one daily row with a valid OHLC range.
fn arb_bar() -> impl Strategy<Value = Bar> {
    (0u32..60, 1i64..100_000, 0i64..1_000, 0i64..1_000_000).prop_map(
        |(day, low_cents, spread, volume)| {
            let date = day_offset(day);
            let low = Decimal::new(low_cents, 2);
            let high = low + Decimal::new(spread, 2);
            Bar::new(date, low, high, low, high, Decimal::from(volume))
        },
    )
}

fn day_offset(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(u64::from(day))
}

/// Generates FRED observations in arbitrary order, with repeated dates and
/// missing values.
fn arb_observations() -> impl Strategy<Value = Vec<(u32, Option<u32>)>> {
    proptest::collection::vec((0u32..30, proptest::option::of(1u32..100_000)), 0..40)
}

fn observations_payload(observations: &[(u32, Option<u32>)]) -> RawPayload {
    let entries: Vec<serde_json::Value> = observations
        .iter()
        .map(|(day, value)| {
            let value = match value {
                Some(cents) => format!("{}.{:02}", cents / 100, cents % 100),
                None => ".".to_string(),
            };
            serde_json::json!({
                "date": day_offset(*day).format("%Y-%m-%d").to_string(),
                "value": value,
            })
        })
        .collect();
    let body = serde_json::json!({ "observations": entries });
    RawPayload::new(PayloadShape::FredObservations, body.to_string())
}

fn frame_for(seed: usize) -> CanonicalFrame {
    let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    CanonicalFrame::from_rows(
        Cow::Borrowed("YAHOO"),
        vec![Bar::flat(date, Decimal::from(seed as i64 + 1))],
    )
    .unwrap()
}

fn table_for(tickers: &[Ticker]) -> PriceTable {
    tickers
        .iter()
        .enumerate()
        .map(|(i, t)| (t.clone(), frame_for(i)))
        .collect()
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any permutation of a ticker list, with or without duplicates, maps to
    /// the same batch key.
    #[test]
    fn prop_batch_key_ignores_order_and_duplicates(
        tickers in arb_tickers(),
        seed in any::<u64>(),
    ) {
        let window = RequestWindow::daily("5d");
        let mut shuffled = tickers.clone();
        shuffled.rotate_left((seed as usize) % tickers.len());
        shuffled.reverse();
        shuffled.push(tickers[0].clone());

        let a = BatchKey::new(tickers.iter().map(String::as_str), window.clone());
        let b = BatchKey::new(shuffled.iter().map(String::as_str), window);
        prop_assert_eq!(&a, &b);

        let sorted = a.tickers().windows(2).all(|w| w[0] < w[1]);
        prop_assert!(sorted);
    }

    /// Every subset of a cached batch is served with exactly the requested
    /// tickers and the same frames.
    #[test]
    fn prop_subset_projection_matches_batch(
        tickers in arb_tickers(),
        mask in proptest::collection::vec(any::<bool>(), 8),
    ) {
        let window = RequestWindow::daily("5d");
        let key = BatchKey::new(tickers.iter().map(String::as_str), window.clone());
        let table = table_for(key.tickers());

        let mut cache = CacheStore::new();
        cache.put(key.clone(), &table);

        let subset: Vec<Ticker> = key
            .tickers()
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(t, _)| t.clone())
            .collect();
        prop_assume!(!subset.is_empty());

        let hit = cache.get_subset(&subset, &window).unwrap();
        prop_assert_eq!(hit.len(), subset.len());
        for ticker in &subset {
            prop_assert_eq!(hit.get(ticker), table.get(ticker));
        }

        // The window never matches loosely
        prop_assert!(cache.get_subset(&subset, &RequestWindow::daily("1mo")).is_none());
    }

    /// Writing the same key twice leaves the stored entry and every entry
    /// count unchanged.
    #[test]
    fn prop_cache_writes_are_idempotent(tickers in arb_tickers()) {
        let window = RequestWindow::daily("5d");
        let key = BatchKey::new(tickers.iter().map(String::as_str), window);
        let table = table_for(key.tickers());

        let mut cache = CacheStore::new();
        prop_assert!(cache.put(key.clone(), &table));
        let singles = cache.single_len();

        prop_assert!(!cache.put(key.clone(), &table));
        prop_assert_eq!(cache.batch_len(), 1);
        prop_assert_eq!(cache.single_len(), singles);
        prop_assert_eq!(cache.get_exact(&key), Some(&table));
    }

    /// Frames are sorted, one row per date, and never longer than the input.
    #[test]
    fn prop_frame_rows_sorted_and_unique(
        bars in proptest::collection::vec(arb_bar(), 1..40),
    ) {
        let input_len = bars.len();
        let frame = CanonicalFrame::from_rows(Cow::Borrowed("YAHOO"), bars).unwrap();

        prop_assert!(frame.len() <= input_len);
        prop_assert!(frame.rows().windows(2).all(|w| w[0].date < w[1].date));
        prop_assert!(frame.rows().iter().all(|r| r.high >= r.low));
    }

    /// Tail keeps the most recent rows.
    #[test]
    fn prop_tail_keeps_latest(
        bars in proptest::collection::vec(arb_bar(), 1..40),
        n in 1usize..10,
    ) {
        let frame = CanonicalFrame::from_rows(Cow::Borrowed("YAHOO"), bars).unwrap();
        let last = frame.last().cloned();
        let expected = frame.len().min(n);

        let tail = frame.tail(n);
        prop_assert_eq!(tail.len(), expected);
        prop_assert_eq!(tail.last().cloned(), last);
    }

    /// Normalized frames are sorted with one row per date, keep every
    /// distinct date that carried a value, and hold only positive prices.
    #[test]
    fn prop_normalized_observations_are_canonical(observations in arb_observations()) {
        let payload = observations_payload(&observations);
        let frame = normalize(Cow::Borrowed("FRED"), &payload).unwrap();

        let mut valued_days: Vec<u32> = observations
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(day, _)| *day)
            .collect();
        valued_days.sort_unstable();
        valued_days.dedup();

        match frame {
            None => {
                prop_assert!(valued_days.is_empty());
            }
            Some(frame) => {
                prop_assert_eq!(frame.len(), valued_days.len());
                prop_assert!(frame.rows().windows(2).all(|w| w[0].date < w[1].date));
                prop_assert!(frame.rows().iter().all(|r| r.close > Decimal::ZERO));
                prop_assert_eq!(frame.source(), "FRED");
            }
        }
    }
}
