//! Alpha Vantage market data provider implementation.
//!
//! This module provides market data from Alpha Vantage API:
//! - Equities and index proxy ETFs via TIME_SERIES_DAILY endpoint
//! - FX rates via FX_DAILY endpoint
//! - Cryptocurrencies via DIGITAL_CURRENCY_DAILY endpoint
//! - Fundamentals via OVERVIEW + GLOBAL_QUOTE
//!
//! Note: Alpha Vantage free tier is limited to a handful of calls per minute
//! and a small daily quota, so this adapter is spaced at 5 seconds.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RequestWindow};
use crate::provider::http::{build_client, send_text};
use crate::provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

const BASE_URL: &str = "https://www.alphavantage.co/query";
pub const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// `compact` output holds the latest 100 sessions.
const COMPACT_ROWS: usize = 100;

/// Alpha Vantage market data provider.
///
/// Without an API key the provider reports itself unconfigured and the
/// manager skips it for the whole session.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: Option<String>,
}

// ============================================================================
// Notice detection
// ============================================================================

/// Notice fields Alpha Vantage returns with HTTP 200 instead of data.
#[derive(Debug, Default, Deserialize)]
struct ApiNotice {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

fn is_daily_quota_message(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    lower.contains("standard api rate limit")
        || lower.contains("requests per day")
        || lower.contains("daily rate limit")
}

fn is_frequency_message(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    lower.contains("call frequency") || lower.contains("rate limit")
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: Option<String>) -> Result<Self, MarketDataError> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        let client = build_client(PROVIDER_ID, Duration::from_secs(20))?;
        Ok(Self { client, api_key })
    }

    /// Classify the notice fields of a response body.
    ///
    /// Daily quota messages trip the breaker, call-frequency notes are a
    /// soft rate limit, and an error message means the symbol has no data.
    fn check_notices(body: &str) -> Result<(), MarketDataError> {
        let notice: ApiNotice = serde_json::from_str(body).map_err(|e| MarketDataError::Malformed {
            provider: PROVIDER_ID.to_string(),
            message: e.to_string(),
        })?;

        if let Some(msg) = notice.error_message {
            return Err(MarketDataError::NoData(msg));
        }

        if let Some(ref msg) = notice.information {
            if is_daily_quota_message(msg) {
                return Err(MarketDataError::QuotaExhausted {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            if is_frequency_message(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage info: {}", msg);
        }

        if let Some(ref msg) = notice.note {
            if is_frequency_message(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        Ok(())
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::Config("ALPHA_VANTAGE_KEY is not set".to_string()))?;

        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", api_key));

        let url = reqwest::Url::parse_with_params(BASE_URL, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(api_key, "***")
        );

        let body = send_text(PROVIDER_ID, self.client.get(url)).await?;
        Self::check_notices(&body)?;
        Ok(body)
    }

    async fn fetch_series_payload(
        &self,
        symbol: &ProviderSymbol,
        window: &RequestWindow,
    ) -> Result<RawPayload, MarketDataError> {
        let rows = window.trading_days();
        let output_size = if rows > COMPACT_ROWS { "full" } else { "compact" };

        let (body, shape) = match symbol {
            ProviderSymbol::Equity { symbol } => {
                let body = self
                    .fetch(&[
                        ("function", "TIME_SERIES_DAILY"),
                        ("symbol", symbol.as_ref()),
                        ("outputsize", output_size),
                    ])
                    .await?;
                (body, PayloadShape::AlphaVantageDaily)
            }
            ProviderSymbol::CryptoPair { symbol, market } => {
                let body = self
                    .fetch(&[
                        ("function", "DIGITAL_CURRENCY_DAILY"),
                        ("symbol", symbol.as_ref()),
                        ("market", market.as_ref()),
                    ])
                    .await?;
                (body, PayloadShape::AlphaVantageCrypto)
            }
            ProviderSymbol::FxPair { from, to } => {
                let body = self
                    .fetch(&[
                        ("function", "FX_DAILY"),
                        ("from_symbol", from.as_ref()),
                        ("to_symbol", to.as_ref()),
                        ("outputsize", output_size),
                    ])
                    .await?;
                (body, PayloadShape::AlphaVantageFx)
            }
            other => {
                return Err(MarketDataError::NoData(format!(
                    "Alpha Vantage cannot serve {}",
                    other
                )))
            }
        };

        Ok(RawPayload::new(shape, body).with_row_limit(rows))
    }

    /// OVERVIEW plus GLOBAL_QUOTE, combined into one JSON document.
    ///
    /// A failed GLOBAL_QUOTE after a good OVERVIEW still yields a payload.
    async fn fetch_info_payload(&self, symbol: &str) -> Result<RawPayload, MarketDataError> {
        let overview = self
            .fetch(&[("function", "OVERVIEW"), ("symbol", symbol)])
            .await?;
        let overview: Value =
            serde_json::from_str(&overview).map_err(|e| MarketDataError::Malformed {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        let quote = match self
            .fetch(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await
        {
            Ok(body) => serde_json::from_str(&body).unwrap_or(Value::Null),
            Err(e @ MarketDataError::QuotaExhausted { .. }) => return Err(e),
            Err(e) => {
                warn!("Alpha Vantage: GLOBAL_QUOTE failed for {}: {}", symbol, e);
                Value::Null
            }
        };

        let combined = serde_json::json!({ "overview": overview, "quote": quote });
        Ok(RawPayload::new(
            PayloadShape::AlphaVantageInfo,
            combined.to_string(),
        ))
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_history: true,
            supports_info: true,
            intervals: &["1d"],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            min_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(20),
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome {
        debug!("Fetching {} ({}) from Alpha Vantage", symbol, window);
        self.fetch_series_payload(symbol, window).await.into()
    }

    async fn fetch_info(&self, symbol: &ProviderSymbol) -> FetchOutcome {
        match symbol {
            ProviderSymbol::Equity { symbol } => self.fetch_info_payload(symbol).await.into(),
            _ => FetchOutcome::Empty,
        }
    }
}
