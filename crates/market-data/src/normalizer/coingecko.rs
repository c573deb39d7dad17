//! CoinGecko market_chart parsing.
//!
//! The endpoint only returns `[timestamp_ms, value]` pairs for price and
//! volume. Daily bars are built with open = previous close and high/low
//! spanning open and close.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::Bar;

use super::malformed;

const PROVIDER_ID: &str = "COINGECKO";

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
    #[serde(default)]
    total_volumes: Vec<(f64, f64)>,
}

/// Collapse points to one value per UTC date, keeping the latest point.
fn by_date(points: &[(f64, f64)]) -> BTreeMap<NaiveDate, f64> {
    points
        .iter()
        .filter(|(_, v)| v.is_finite())
        .filter_map(|(ts, v)| {
            let date = DateTime::from_timestamp_millis(*ts as i64)?.date_naive();
            Some((date, *v))
        })
        .collect()
}

pub(super) fn market_chart_rows(body: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: MarketChartResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    let closes = by_date(&response.prices);
    let volumes = by_date(&response.total_volumes);

    let mut rows = Vec::with_capacity(closes.len());
    let mut prev_close: Option<f64> = None;
    for (date, close) in closes {
        let open = prev_close.replace(close).unwrap_or(close);
        // A date without a volume sample is dropped, not zero-filled.
        let Some(volume) = volumes.get(&date).copied() else {
            continue;
        };
        if let Some(bar) =
            Bar::from_f64(date, open, open.max(close), open.min(close), close, volume)
        {
            rows.push(bar);
        }
    }
    Ok(rows)
}
