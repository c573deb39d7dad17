//! Eastmoney push2his kline parsing.
//!
//! Each kline is a comma-joined record in the order requested by `fields2`:
//! `date,open,close,high,low,volume,amount`. Note close precedes high/low.

use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::Bar;

use super::{malformed, parse_date, parse_decimal};

const PROVIDER_ID: &str = "EASTMONEY";

#[derive(Debug, Deserialize)]
struct KlineResponse {
    /// `null` when the secid is unknown
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Vec<String>,
}

fn parse_kline(line: &str) -> Option<Bar> {
    let mut parts = line.split(',');
    let date = parse_date(parts.next()?)?;
    let open = parse_decimal(parts.next()?)?;
    let close = parse_decimal(parts.next()?)?;
    let high = parse_decimal(parts.next()?)?;
    let low = parse_decimal(parts.next()?)?;
    let volume = parse_decimal(parts.next()?)?;
    Some(Bar::new(date, open, high, low, close, volume))
}

pub(super) fn kline_rows(body: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: KlineResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    Ok(response
        .data
        .map(|data| data.klines.iter().filter_map(|l| parse_kline(l)).collect())
        .unwrap_or_default())
}
