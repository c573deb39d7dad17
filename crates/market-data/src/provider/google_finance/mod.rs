//! Google Finance quote page scraper.
//!
//! Last-resort tier for index levels that have no usable symbol elsewhere
//! (e.g. `^RUT`, `^VIX`). A quote page only carries the latest price, so
//! the resulting frame has a single row dated on the fetch day.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client};
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RequestWindow};
use crate::provider::http::{build_client, send_text};
use crate::provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

pub const PROVIDER_ID: &str = "GOOGLE_FINANCE";

const QUOTE_URL: &str = "https://www.google.com/finance/quote";

pub struct GoogleFinanceProvider {
    client: Client,
}

impl GoogleFinanceProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let client = build_client(PROVIDER_ID, Duration::from_secs(10))?;
        Ok(Self { client })
    }

    async fn fetch_quote_page(&self, path: &str) -> Result<RawPayload, MarketDataError> {
        let url = format!("{}/{}", QUOTE_URL, path);
        let request = self
            .client
            .get(&url)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9");

        let body = send_text(PROVIDER_ID, request).await?;
        let as_of = Utc::now().date_naive();
        Ok(RawPayload::new(PayloadShape::GoogleFinanceQuote { as_of }, body))
    }
}

#[async_trait]
impl MarketDataProvider for GoogleFinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_history: true,
            supports_info: false,
            intervals: &["1d"],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            min_interval: Duration::from_millis(1500),
            timeout: Duration::from_secs(10),
        }
    }

    async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome {
        let ProviderSymbol::Page { path } = symbol else {
            return FetchOutcome::Empty;
        };
        debug!("Scraping Google Finance {} ({})", path, window);
        self.fetch_quote_page(path).await.into()
    }
}
