//! Yahoo Finance API response models.
//!
//! Chart responses carry parallel arrays (timestamps plus one array per OHLCV
//! column, with `null` holes). quoteSummary responses wrap every number as
//! `{"raw": 123.45, "fmt": "123.45"}` or an empty object when absent.

use chrono::DateTime;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{Bar, InfoSource, TickerInfo};

use super::malformed;

const PROVIDER_ID: &str = "YAHOO";

// ============================================================================
// Chart
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

pub(super) fn chart_rows(body: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let offset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    Ok(result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            // Exchange-local date, not the UTC date of the bar's timestamp.
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            // FX and some indices omit the volume column entirely.
            let volume = if quote.volume.is_empty() {
                0.0
            } else {
                at(&quote.volume, i)?
            };
            Bar::from_f64(
                date,
                at(&quote.open, i)?,
                at(&quote.high, i)?,
                at(&quote.low, i)?,
                at(&quote.close, i)?,
                volume,
            )
        })
        .collect())
}

// ============================================================================
// quoteSummary
// ============================================================================

/// Main response wrapper for quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteSummaryResponse {
    quote_summary: YahooQuoteSummary,
}

/// Quote summary container
#[derive(Debug, Deserialize)]
struct YahooQuoteSummary {
    #[serde(default)]
    result: Option<Vec<YahooQuoteSummaryResult>>,
}

/// Individual result from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteSummaryResult {
    price: Option<YahooPriceData>,
    summary_profile: Option<YahooSummaryProfile>,
    summary_detail: Option<YahooSummaryDetail>,
    default_key_statistics: Option<YahooKeyStatistics>,
    financial_data: Option<YahooFinancialData>,
}

/// Number with raw and formatted values
#[derive(Debug, Deserialize, Clone)]
struct YahooValue {
    raw: Option<f64>,
}

type Raw = Option<YahooValue>;

fn raw(value: &Raw) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooPriceData {
    currency: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    quote_type: Option<String>,
    regular_market_price: Raw,
    regular_market_previous_close: Raw,
    regular_market_change_percent: Raw,
    market_cap: Raw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryProfile {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryDetail {
    market_cap: Raw,
    #[serde(rename = "trailingPE")]
    trailing_pe: Raw,
    #[serde(rename = "forwardPE")]
    forward_pe: Raw,
    dividend_yield: Raw,
    beta: Raw,
    fifty_two_week_high: Raw,
    fifty_two_week_low: Raw,
    previous_close: Raw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooKeyStatistics {
    #[serde(rename = "forwardPE")]
    forward_pe: Raw,
    peg_ratio: Raw,
    beta: Raw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooFinancialData {
    current_price: Raw,
    return_on_equity: Raw,
    profit_margins: Raw,
    operating_margins: Raw,
    debt_to_equity: Raw,
}

pub(super) fn quote_summary_info(
    ticker: &str,
    body: &str,
) -> Result<Option<TickerInfo>, MarketDataError> {
    let response: YahooQuoteSummaryResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    let Some(result) = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
    else {
        return Ok(None);
    };

    let price = result.price.as_ref();
    let profile = result.summary_profile.as_ref();
    let detail = result.summary_detail.as_ref();
    let stats = result.default_key_statistics.as_ref();
    let financial = result.financial_data.as_ref();

    let info = TickerInfo {
        symbol: ticker.to_string(),
        source: Some(InfoSource::Provider(PROVIDER_ID.to_string())),
        name: price.and_then(|p| p.long_name.clone().or_else(|| p.short_name.clone())),
        quote_type: price.and_then(|p| p.quote_type.clone()).map(|t| t.to_uppercase()),
        sector: profile.and_then(|p| p.sector.clone()),
        industry: profile.and_then(|p| p.industry.clone()),
        currency: price.and_then(|p| p.currency.clone()),
        market_cap: detail
            .and_then(|d| raw(&d.market_cap))
            .or_else(|| price.and_then(|p| raw(&p.market_cap))),
        trailing_pe: detail.and_then(|d| raw(&d.trailing_pe)),
        forward_pe: detail
            .and_then(|d| raw(&d.forward_pe))
            .or_else(|| stats.and_then(|s| raw(&s.forward_pe))),
        peg_ratio: stats.and_then(|s| raw(&s.peg_ratio)),
        return_on_equity: financial.and_then(|f| raw(&f.return_on_equity)),
        profit_margins: financial.and_then(|f| raw(&f.profit_margins)),
        operating_margins: financial.and_then(|f| raw(&f.operating_margins)),
        debt_to_equity: financial.and_then(|f| raw(&f.debt_to_equity)),
        beta: detail
            .and_then(|d| raw(&d.beta))
            .or_else(|| stats.and_then(|s| raw(&s.beta))),
        dividend_yield: detail.and_then(|d| raw(&d.dividend_yield)),
        week_52_high: detail.and_then(|d| raw(&d.fifty_two_week_high)),
        week_52_low: detail.and_then(|d| raw(&d.fifty_two_week_low)),
        current_price: price
            .and_then(|p| raw(&p.regular_market_price))
            .or_else(|| financial.and_then(|f| raw(&f.current_price))),
        previous_close: price
            .and_then(|p| raw(&p.regular_market_previous_close))
            .or_else(|| detail.and_then(|d| raw(&d.previous_close))),
        // quoteSummary reports the change as a fraction
        change_pct: price
            .and_then(|p| raw(&p.regular_market_change_percent))
            .map(|v| v * 100.0),
    };

    if info.attribute_count() == 0 {
        Ok(None)
    } else {
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_chart_rows_skip_null_holes() {
        let body = r#"{"chart":{"result":[{
            "meta":{"symbol":"^GSPC","gmtoffset":-18000},
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{"quote":[{
                "open":[4745.2,null,4697.4],
                "high":[4754.3,4729.3,4726.8],
                "low":[4722.7,4699.7,4687.5],
                "close":[4742.8,4704.8,4688.7],
                "volume":[3743050000,3950760000,null]
            }]}
        }],"error":null}}"#;
        let rows = chart_rows(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(rows[0].close, dec!(4742.8));
        assert_eq!(rows[0].volume, dec!(3743050000));
    }

    #[test]
    fn test_chart_rows_without_volume_column() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1704153600,1704240000],
            "indicators":{"quote":[{
                "open":[7.10,7.12],"high":[7.15,7.16],"low":[7.08,7.10],"close":[7.12,7.14]
            }]}
        }],"error":null}}"#;
        let rows = chart_rows(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.volume == dec!(0)));
    }

    #[test]
    fn test_chart_rows_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        assert!(chart_rows(body).unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_value_empty_object() {
        // Yahoo returns empty objects {} for fields with no data
        let value: YahooValue = serde_json::from_str("{}").unwrap();
        assert_eq!(value.raw, None);
    }

    #[test]
    fn test_quote_summary_info() {
        let body = r#"{"quoteSummary":{"result":[{
            "price":{"longName":"Apple Inc.","quoteType":"equity","currency":"USD",
                     "regularMarketPrice":{"raw":190.5,"fmt":"190.50"},
                     "regularMarketPreviousClose":{"raw":188.0},
                     "regularMarketChangePercent":{"raw":0.0133}},
            "summaryProfile":{"sector":"Technology","industry":"Consumer Electronics"},
            "summaryDetail":{"trailingPE":{"raw":31.2},"dividendYield":{},"beta":{"raw":1.2}},
            "defaultKeyStatistics":{"forwardPE":{"raw":28.1},"pegRatio":{"raw":2.1}},
            "financialData":{"returnOnEquity":{"raw":1.47},"debtToEquity":{"raw":145.0}}
        }],"error":null}}"#;
        let info = quote_summary_info("AAPL", body).unwrap().unwrap();
        assert_eq!(info.name.as_deref(), Some("Apple Inc."));
        assert_eq!(info.quote_type.as_deref(), Some("EQUITY"));
        assert_eq!(info.forward_pe, Some(28.1));
        assert_eq!(info.dividend_yield, None);
        assert_eq!(info.return_on_equity, Some(1.47));
        assert!((info.change_pct.unwrap() - 1.33).abs() < 1e-9);
    }

    #[test]
    fn test_quote_summary_empty_result() {
        let body = r#"{"quoteSummary":{"result":[],"error":null}}"#;
        assert!(quote_summary_info("NOPE", body).unwrap().is_none());
    }
}
