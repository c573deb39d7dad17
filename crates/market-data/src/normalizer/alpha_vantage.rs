//! Alpha Vantage payload parsing.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Bar, InfoSource, TickerInfo};

use super::{malformed, parse_date, parse_decimal, parse_f64, parse_nonzero_f64};

const PROVIDER_ID: &str = "ALPHA_VANTAGE";

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// TIME_SERIES_DAILY response for equities
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyQuote>>,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// FX_DAILY response for forex pairs
#[derive(Debug, Deserialize)]
struct FxDailyResponse {
    #[serde(rename = "Time Series FX (Daily)")]
    time_series: Option<HashMap<String, FxDailyQuote>>,
}

#[derive(Debug, Deserialize)]
struct FxDailyQuote {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}

/// DIGITAL_CURRENCY_DAILY response for cryptocurrencies
#[derive(Debug, Deserialize)]
struct CryptoDailyResponse {
    #[serde(rename = "Time Series (Digital Currency Daily)")]
    time_series: Option<HashMap<String, CryptoDailyQuote>>,
}

/// Crypto daily quote with dynamic field names.
///
/// Older payloads use "1a. open (USD)", newer ones "1. open".
#[derive(Debug, Deserialize)]
struct CryptoDailyQuote {
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

impl CryptoDailyQuote {
    fn field(&self, prefixes: &[&str]) -> Option<rust_decimal::Decimal> {
        prefixes.iter().find_map(|prefix| {
            self.fields
                .iter()
                .find(|(key, _)| key.starts_with(prefix))
                .and_then(|(_, value)| value.as_str())
                .and_then(parse_decimal)
        })
    }
}

/// OVERVIEW response (company fundamentals)
#[derive(Debug, Default, Deserialize)]
struct CompanyOverview {
    #[serde(rename = "AssetType")]
    asset_type: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Currency")]
    currency: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "TrailingPE")]
    trailing_pe: Option<String>,
    #[serde(rename = "ForwardPE")]
    forward_pe: Option<String>,
    #[serde(rename = "PEGRatio")]
    peg_ratio: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    return_on_equity: Option<String>,
    #[serde(rename = "ProfitMargin")]
    profit_margin: Option<String>,
    #[serde(rename = "OperatingMarginTTM")]
    operating_margin: Option<String>,
    #[serde(rename = "Beta")]
    beta: Option<String>,
    #[serde(rename = "DividendYield")]
    dividend_yield: Option<String>,
    #[serde(rename = "52WeekHigh")]
    week_52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    week_52_low: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<GlobalQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CombinedInfo {
    #[serde(default)]
    overview: Value,
    #[serde(default)]
    quote: Value,
}

/// Minimum populated attributes for an OVERVIEW result to count.
const MIN_INFO_ATTRIBUTES: usize = 3;

// ============================================================================
// Parsing
// ============================================================================

pub(super) fn daily_rows(body: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: TimeSeriesResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    Ok(response
        .time_series
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(date, q)| {
            Some(Bar::new(
                parse_date(&date)?,
                parse_decimal(&q.open)?,
                parse_decimal(&q.high)?,
                parse_decimal(&q.low)?,
                parse_decimal(&q.close)?,
                parse_decimal(&q.volume)?,
            ))
        })
        .collect())
}

pub(super) fn fx_rows(body: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: FxDailyResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    Ok(response
        .time_series
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(date, q)| {
            Some(Bar::new(
                parse_date(&date)?,
                parse_decimal(&q.open)?,
                parse_decimal(&q.high)?,
                parse_decimal(&q.low)?,
                parse_decimal(&q.close)?,
                // FX_DAILY carries no volume column.
                rust_decimal::Decimal::ZERO,
            ))
        })
        .collect())
}

pub(super) fn crypto_rows(body: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: CryptoDailyResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    Ok(response
        .time_series
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(date, q)| {
            Some(Bar::new(
                parse_date(&date)?,
                q.field(&["1a. open", "1. open"])?,
                q.field(&["2a. high", "2. high"])?,
                q.field(&["3a. low", "3. low"])?,
                q.field(&["4a. close", "4. close"])?,
                q.field(&["5. volume"])?,
            ))
        })
        .collect())
}

/// Normalize an OVERVIEW + GLOBAL_QUOTE document.
///
/// Returns `None` when fewer than four attributes are populated; a bare
/// overview usually means the symbol is an ETF or unknown.
pub(super) fn info(ticker: &str, body: &str) -> Result<Option<TickerInfo>, MarketDataError> {
    let combined: CombinedInfo =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;
    let overview: CompanyOverview = serde_json::from_value(combined.overview).unwrap_or_default();
    let quote = serde_json::from_value::<GlobalQuoteResponse>(combined.quote)
        .unwrap_or_default()
        .quote
        .unwrap_or_default();

    let quote_type = overview.asset_type.as_ref().map(|t| match t.to_uppercase().as_str() {
        "COMMON STOCK" => "EQUITY".to_string(),
        "MUTUAL FUND" => "MUTUALFUND".to_string(),
        other => other.to_string(),
    });

    let info = TickerInfo {
        symbol: ticker.to_string(),
        source: Some(InfoSource::Provider(PROVIDER_ID.to_string())),
        name: overview.name.filter(|n| !n.is_empty() && n != "None"),
        quote_type,
        sector: overview.sector.filter(|s| !s.is_empty() && s != "None"),
        industry: overview.industry.filter(|s| !s.is_empty() && s != "None"),
        currency: overview.currency,
        market_cap: parse_nonzero_f64(&overview.market_capitalization),
        trailing_pe: parse_nonzero_f64(&overview.trailing_pe)
            .or_else(|| parse_nonzero_f64(&overview.pe_ratio)),
        forward_pe: parse_nonzero_f64(&overview.forward_pe),
        peg_ratio: parse_nonzero_f64(&overview.peg_ratio),
        return_on_equity: parse_f64(&overview.return_on_equity),
        profit_margins: parse_f64(&overview.profit_margin),
        operating_margins: parse_f64(&overview.operating_margin),
        debt_to_equity: None,
        beta: parse_f64(&overview.beta),
        dividend_yield: parse_f64(&overview.dividend_yield),
        week_52_high: parse_nonzero_f64(&overview.week_52_high),
        week_52_low: parse_nonzero_f64(&overview.week_52_low),
        current_price: parse_nonzero_f64(&quote.price),
        previous_close: parse_nonzero_f64(&quote.previous_close),
        change_pct: quote
            .change_percent
            .as_deref()
            .map(|s| s.trim_end_matches('%'))
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite()),
    };

    if info.attribute_count() > MIN_INFO_ATTRIBUTES {
        Ok(Some(info))
    } else {
        Ok(None)
    }
}
