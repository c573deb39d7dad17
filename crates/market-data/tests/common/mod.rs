//! Scripted providers and payload builders shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use reportdesk_market_data::{
    FetchOutcome, ManagerSettings, MarketDataManager, MarketDataProvider, PayloadShape,
    ProviderCapabilities, ProviderSymbol, RateLimit, RawPayload, RequestWindow,
};

type Responder = Box<dyn Fn(&ProviderSymbol, usize) -> FetchOutcome + Send + Sync>;

/// Provider whose answers come from closures. The closure gets the provider
/// symbol and the zero-based call index.
pub struct ScriptedProvider {
    id: &'static str,
    supports_history: bool,
    supports_info: bool,
    configured: bool,
    series: Responder,
    info: Responder,
    series_calls: AtomicUsize,
    info_calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            supports_history: true,
            supports_info: false,
            configured: true,
            series: Box::new(|_, _| FetchOutcome::Empty),
            info: Box::new(|_, _| FetchOutcome::Empty),
            series_calls: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn series<F>(mut self, responder: F) -> Self
    where
        F: Fn(&ProviderSymbol, usize) -> FetchOutcome + Send + Sync + 'static,
    {
        self.series = Box::new(responder);
        self
    }

    /// Same series outcome for every call.
    pub fn always(self, outcome: FetchOutcome) -> Self {
        self.series(move |_, _| outcome.clone())
    }

    pub fn info<F>(mut self, responder: F) -> Self
    where
        F: Fn(&ProviderSymbol, usize) -> FetchOutcome + Send + Sync + 'static,
    {
        self.supports_info = true;
        self.info = Box::new(responder);
        self
    }

    pub fn info_only(mut self) -> Self {
        self.supports_history = false;
        self
    }

    pub fn not_configured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn series_calls(&self) -> usize {
        self.series_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    /// Provider symbols requested so far, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_history: self.supports_history,
            supports_info: self.supports_info,
            intervals: &["1d", "1wk"],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch_series(&self, symbol: &ProviderSymbol, _window: &RequestWindow) -> FetchOutcome {
        let n = self.series_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(symbol.to_string());
        (self.series)(symbol, n)
    }

    async fn fetch_info(&self, symbol: &ProviderSymbol) -> FetchOutcome {
        let n = self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(symbol.to_string());
        (self.info)(symbol, n)
    }
}

/// Manager over the given tiers with spacing and backoff disabled.
pub fn manager(tiers: &[&Arc<ScriptedProvider>]) -> MarketDataManager {
    let providers: Vec<Arc<dyn MarketDataProvider>> = tiers
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn MarketDataProvider>)
        .collect();
    MarketDataManager::with_settings(providers, ManagerSettings::immediate())
}

/// Default daily closes, inside every bounded ticker's sanity range.
pub const CLOSES: [f64; 5] = [190.0, 191.0, 192.0, 193.0, 194.0];

/// Yahoo chart payload with one daily bar per close, starting 2024-01-02.
pub fn yahoo_chart(closes: &[f64]) -> FetchOutcome {
    let start = 1_704_205_800_i64;
    let timestamps: Vec<i64> = (0..closes.len() as i64).map(|i| start + i * 86_400).collect();
    let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
    let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
    let volumes = vec![1_000_000.0; closes.len()];
    let body = json!({
        "chart": {
            "result": [{
                "meta": { "gmtoffset": 0 },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{
                        "open": closes,
                        "high": highs,
                        "low": lows,
                        "close": closes,
                        "volume": volumes,
                    }]
                }
            }]
        }
    });
    FetchOutcome::Success(RawPayload::new(PayloadShape::YahooChart, body.to_string()))
}

/// quoteSummary payload with a price and, optionally, fundamentals.
pub fn yahoo_summary(name: &str, price: f64, with_fundamentals: bool) -> FetchOutcome {
    let mut result = json!({
        "price": {
            "longName": name,
            "currency": "USD",
            "quoteType": "equity",
            "regularMarketPrice": { "raw": price },
        }
    });
    if with_fundamentals {
        result["financialData"] = json!({
            "returnOnEquity": { "raw": 1.47 },
            "debtToEquity": { "raw": 145.0 },
        });
        result["summaryDetail"] = json!({ "forwardPE": { "raw": 28.5 } });
    }
    let body = json!({ "quoteSummary": { "result": [result] } });
    FetchOutcome::Success(RawPayload::new(
        PayloadShape::YahooQuoteSummary,
        body.to_string(),
    ))
}

/// stockanalysis ratios page.
pub fn ratios_page(pe: f64, roe_pct: f64) -> FetchOutcome {
    let html = format!(
        "<table><tr><td>PE Ratio</td><td>{}</td></tr>\
         <tr><td>Return on Equity (ROE)</td><td>{}%</td></tr></table>",
        pe, roe_pct
    );
    FetchOutcome::Success(RawPayload::new(PayloadShape::StockAnalysisRatios, html))
}

/// FRED observations payload. A value of `"."` marks a missing observation.
pub fn fred_observations(points: &[(&str, &str)]) -> FetchOutcome {
    let observations: Vec<serde_json::Value> = points
        .iter()
        .map(|(date, value)| json!({ "date": date, "value": value }))
        .collect();
    let body = json!({ "observations": observations });
    FetchOutcome::Success(RawPayload::new(
        PayloadShape::FredObservations,
        body.to_string(),
    ))
}
