//! HTML scrapes: Google Finance quote pages and stockanalysis ratio pages.
//!
//! Both pages are parsed defensively. A page that changed layout yields no
//! rows (or no info) rather than an error, so the caller treats it as Empty.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

use crate::models::{finite_decimal, Bar, InfoSource, TickerInfo};

lazy_static! {
    static ref DISPLAY_PRICE: Option<Regex> =
        Regex::new(r#"class="YMlKec fxKbKc"[^>]*>([0-9,]+\.?\d*)"#).ok();
    static ref RETURN_ON_EQUITY: Option<Regex> =
        Regex::new(r"(?s)Return on Equity.*?([0-9.-]+)%").ok();
    static ref PE_RATIO: Option<Regex> = Regex::new(r"(?s)PE Ratio.*?([0-9.,]+)").ok();
    static ref DEBT_TO_EQUITY: Option<Regex> =
        Regex::new(r"(?s)Debt / Equity.*?([0-9.,]+)").ok();
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn capture(re: &Option<Regex>, html: &str) -> Option<f64> {
    let m = re.as_ref()?.captures(html)?.get(1)?;
    parse_number(m.as_str())
}

fn last_price_attribute(html: &str) -> Option<f64> {
    let selector = Selector::parse("[data-last-price]").ok()?;
    let document = Html::parse_document(html);
    let element = document.select(&selector).next()?;
    parse_number(element.value().attr("data-last-price")?)
}

/// Latest index level from a Google Finance quote page.
///
/// The page carries only the current level, so the result is a single flat
/// row dated `as_of`.
pub(super) fn google_finance_rows(html: &str, as_of: NaiveDate) -> Vec<Bar> {
    let price = last_price_attribute(html).or_else(|| capture(&DISPLAY_PRICE, html));
    match price.filter(|p| *p > 0.0).and_then(finite_decimal) {
        Some(price) => vec![Bar::flat(as_of, price)],
        None => Vec::new(),
    }
}

/// ROE, PE and debt/equity from a stockanalysis ratios page.
///
/// Returns `None` unless at least ROE or PE was found.
pub(super) fn stock_analysis_info(ticker: &str, html: &str) -> Option<TickerInfo> {
    let return_on_equity = capture(&RETURN_ON_EQUITY, html).map(|v| v / 100.0);
    let forward_pe = capture(&PE_RATIO, html);
    if return_on_equity.is_none() && forward_pe.is_none() {
        return None;
    }

    let mut info = TickerInfo::new(ticker);
    info.source = Some(InfoSource::Provider("STOCK_ANALYSIS".to_string()));
    info.return_on_equity = return_on_equity;
    info.forward_pe = forward_pe;
    // Page shows a plain ratio; attributes carry percent
    info.debt_to_equity = capture(&DEBT_TO_EQUITY, html).map(|v| v * 100.0);
    Some(info)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    }

    #[test]
    fn test_data_last_price_attribute() {
        let html = r#"<html><body>
            <div jsname="ip75Cb" data-last-price="2,084.36" data-currency-code="USD"></div>
            <div>Previous close</div><div class="P6K39c">2,071.90</div>
        </body></html>"#;
        let rows = google_finance_rows(html, day());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day());
        assert_eq!(rows[0].close, dec!(2084.36));
    }

    #[test]
    fn test_display_price_fallback() {
        let html = r#"<div class="YMlKec fxKbKc">14.52</div>"#;
        let rows = google_finance_rows(html, day());
        assert_eq!(rows[0].close, dec!(14.52));
    }

    #[test]
    fn test_consent_page_yields_nothing() {
        let html = "<html><body>Before you continue to Google</body></html>";
        assert!(google_finance_rows(html, day()).is_empty());
    }

    #[test]
    fn test_stock_analysis_ratios() {
        let html = r#"<table>
            <tr><td>PE Ratio</td><td>31.25</td></tr>
            <tr><td>Debt / Equity</td><td>1.45</td></tr>
            <tr><td>Return on Equity (ROE)</td><td>147.25%</td></tr>
        </table>"#;
        let info = stock_analysis_info("AAPL", html).unwrap();
        assert_eq!(info.forward_pe, Some(31.25));
        assert!((info.return_on_equity.unwrap() - 1.4725).abs() < 1e-9);
        assert!((info.debt_to_equity.unwrap() - 145.0).abs() < 1e-9);
    }

    #[test]
    fn test_stock_analysis_missing_page() {
        assert!(stock_analysis_info("NOPE", "<h1>Page Not Found</h1>").is_none());
    }
}
