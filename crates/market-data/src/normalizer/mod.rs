//! Response normalizer.
//!
//! Converts each provider's native payload into a [`CanonicalFrame`] (series)
//! or a [`TickerInfo`] (attributes). All shape-specific parsing lives in
//! this module so that adding a provider never touches the manager.
//!
//! - `Ok(Some(_))`: at least one usable row/attribute set
//! - `Ok(None)`: the payload parsed but had nothing usable
//! - `Err(MarketDataError::Malformed)`: the payload could not be decoded

mod alpha_vantage;
mod coingecko;
mod derived;
mod eastmoney;
mod fred;
mod scrape;
mod yahoo;

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{Bar, CanonicalFrame, ProviderId, TickerInfo};
use crate::provider::{PayloadShape, RawPayload};

pub use derived::info_from_frame;

/// Normalize a series payload into a canonical frame.
///
/// Rows are sorted, deduplicated by date and trimmed to the payload's row
/// limit. Info shapes yield `Ok(None)`.
pub fn normalize(
    source: ProviderId,
    payload: &RawPayload,
) -> Result<Option<CanonicalFrame>, MarketDataError> {
    let body = payload.body.as_str();
    let rows: Vec<Bar> = match &payload.shape {
        PayloadShape::AlphaVantageDaily => alpha_vantage::daily_rows(body)?,
        PayloadShape::AlphaVantageCrypto => alpha_vantage::crypto_rows(body)?,
        PayloadShape::AlphaVantageFx => alpha_vantage::fx_rows(body)?,
        PayloadShape::YahooChart => yahoo::chart_rows(body)?,
        PayloadShape::EastmoneyKline => eastmoney::kline_rows(body)?,
        PayloadShape::CoinGeckoMarketChart => coingecko::market_chart_rows(body)?,
        PayloadShape::FredObservations => fred::observation_rows(body)?,
        PayloadShape::GoogleFinanceQuote { as_of } => scrape::google_finance_rows(body, *as_of),
        PayloadShape::AlphaVantageInfo
        | PayloadShape::YahooQuoteSummary
        | PayloadShape::StockAnalysisRatios => return Ok(None),
    };

    let signed = matches!(payload.shape, PayloadShape::FredObservations);
    let frame = CanonicalFrame::from_rows(
        source,
        rows.into_iter().filter(|bar| is_sane_row(bar, signed)),
    );
    Ok(match (frame, payload.row_limit) {
        (Some(frame), Some(limit)) => Some(frame.tail(limit)),
        (frame, _) => frame,
    })
}

/// Normalize an info payload into ticker attributes.
///
/// Series shapes yield `Ok(None)`.
pub fn normalize_info(
    ticker: &str,
    payload: &RawPayload,
) -> Result<Option<TickerInfo>, MarketDataError> {
    let body = payload.body.as_str();
    match &payload.shape {
        PayloadShape::AlphaVantageInfo => alpha_vantage::info(ticker, body),
        PayloadShape::YahooQuoteSummary => yahoo::quote_summary_info(ticker, body),
        PayloadShape::StockAnalysisRatios => Ok(scrape::stock_analysis_info(ticker, body)),
        _ => Ok(None),
    }
}

/// Rows with an inverted range never reach a frame. Negative values are
/// dropped too unless the series is `signed` (rate spreads go below zero).
fn is_sane_row(bar: &Bar, signed: bool) -> bool {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    (signed || prices.iter().all(|p| !p.is_sign_negative())) && bar.high >= bar.low
}

// ============================================================================
// Shared field parsing
// ============================================================================

fn malformed(provider: &str, err: impl Display) -> MarketDataError {
    MarketDataError::Malformed {
        provider: provider.to_string(),
        message: err.to_string(),
    }
}

/// Parse a date string in YYYY-MM-DD format.
fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

/// Parse a string field as f64, handling "None" and "-" placeholders.
fn parse_f64(s: &Option<String>) -> Option<f64> {
    s.as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "None" && *v != "-")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Like [`parse_f64`], for fields where a literal zero means "not reported"
/// (prices, market cap, valuation multiples).
fn parse_nonzero_f64(s: &Option<String>) -> Option<f64> {
    parse_f64(s).filter(|v| *v != 0.0)
}
