//! Yahoo Finance market data provider implementation.
//!
//! The bulk secondary tier. Serves the v8 chart endpoint, whose `range` and
//! `interval` parameters take the request window tokens as-is, and the
//! quoteSummary endpoint for descriptive/fundamental attributes.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, info, warn};
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RequestWindow};
use crate::provider::http::{build_client, send_text};
use crate::provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

pub const PROVIDER_ID: &str = "YAHOO";

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const SUMMARY_MODULES: &str =
    "price,summaryProfile,summaryDetail,defaultKeyStatistics,financialData";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
///
/// Canonical tickers are Yahoo symbols, so no translation is needed beyond
/// URL encoding (`^GSPC` -> `%5EGSPC`).
pub struct YahooProvider {
    client: Client,
    /// Crumb for quoteSummary, fetched lazily and dropped on 401.
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let client = build_client(PROVIDER_ID, Duration::from_secs(10))?;
        Ok(Self {
            client,
            crumb: RwLock::new(None),
        })
    }

    fn extract_symbol(symbol: &ProviderSymbol) -> Option<&str> {
        match symbol {
            ProviderSymbol::Equity { symbol } => Some(symbol.as_ref()),
            _ => None,
        }
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    fn read_crumb(&self) -> RwLockReadGuard<'_, Option<CrumbData>> {
        self.crumb.read().unwrap_or_else(|poisoned| {
            warn!("Yahoo crumb lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_crumb(&self) -> RwLockWriteGuard<'_, Option<CrumbData>> {
        self.crumb.write().unwrap_or_else(|poisoned| {
            warn!("Yahoo crumb lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        let cached = self.read_crumb().clone();
        match cached {
            Some(crumb) => Ok(crumb),
            None => self.fetch_crumb().await,
        }
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: Get cookie from fc.yahoo.com
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Failed to parse Yahoo cookie".to_string(),
            })?;

        // Step 2: Get crumb using cookie
        let crumb = send_text(
            PROVIDER_ID,
            self.client
                .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
                .header(header::COOKIE, &cookie),
        )
        .await?;

        let crumb_data = CrumbData { cookie, crumb };
        *self.write_crumb() = Some(crumb_data.clone());
        debug!("Yahoo crumb refreshed");

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        *self.write_crumb() = None;
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    async fn fetch_chart(
        &self,
        symbol: &str,
        window: &RequestWindow,
    ) -> Result<RawPayload, MarketDataError> {
        let url = format!(
            "{}/{}?range={}&interval={}&includeAdjustedClose=true",
            CHART_URL,
            encode(symbol),
            encode(&window.period),
            encode(&window.interval)
        );
        let body = send_text(PROVIDER_ID, self.client.get(&url)).await?;
        Ok(RawPayload::new(PayloadShape::YahooChart, body))
    }

    async fn fetch_quote_summary(&self, symbol: &str) -> Result<RawPayload, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "{}/{}?modules={}&crumb={}",
            SUMMARY_URL,
            encode(symbol),
            SUMMARY_MODULES,
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                info!("Yahoo authentication expired, dropping crumb");
                self.clear_crumb();
                Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: "Yahoo authentication expired".to_string(),
                })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            }),
            status if !status.is_success() => Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            }),
            _ => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;
                Ok(RawPayload::new(PayloadShape::YahooQuoteSummary, body))
            }
        }
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_history: true,
            supports_info: true,
            intervals: &["1d", "5d", "1wk", "1mo", "3mo"],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            min_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }

    async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome {
        let Some(symbol) = Self::extract_symbol(symbol) else {
            return FetchOutcome::Empty;
        };
        debug!("Fetching {} ({}) from Yahoo chart", symbol, window);
        self.fetch_chart(symbol, window).await.into()
    }

    async fn fetch_info(&self, symbol: &ProviderSymbol) -> FetchOutcome {
        let Some(symbol) = Self::extract_symbol(symbol) else {
            return FetchOutcome::Empty;
        };
        debug!("Fetching quoteSummary for {}", symbol);
        self.fetch_quote_summary(symbol).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_symbol() {
        let symbol = ProviderSymbol::equity("^GSPC");
        assert_eq!(YahooProvider::extract_symbol(&symbol), Some("^GSPC"));

        let symbol = ProviderSymbol::regional("105.AAPL");
        assert_eq!(YahooProvider::extract_symbol(&symbol), None);
    }

    #[test]
    fn test_capabilities() {
        let provider = YahooProvider::new().unwrap();
        let caps = provider.capabilities();
        assert!(caps.supports_history);
        assert!(caps.supports_info);
        assert!(caps.supports_interval("1wk"));
        assert!(!caps.supports_interval("1m"));
    }

    #[test]
    fn test_rate_limit() {
        let provider = YahooProvider::new().unwrap();
        assert_eq!(provider.rate_limit().min_interval, Duration::from_secs(2));
        assert!(provider.is_configured());
    }

    #[test]
    fn test_clear_crumb() {
        let provider = YahooProvider::new().unwrap();
        *provider.write_crumb() = Some(CrumbData {
            cookie: "A=1".to_string(),
            crumb: "abc".to_string(),
        });
        assert!(provider.read_crumb().is_some());
        provider.clear_crumb();
        assert!(provider.read_crumb().is_none());
    }
}
