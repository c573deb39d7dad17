//! stockanalysis.com ratios scraper.
//!
//! Info-only source used to enrich price-derived info with ROE, PE and
//! debt/equity when no fundamentals endpoint answered.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RequestWindow};
use crate::provider::http::{build_client, send_text};
use crate::provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

pub const PROVIDER_ID: &str = "STOCK_ANALYSIS";

const BASE_URL: &str = "https://stockanalysis.com/stocks";

pub struct StockAnalysisProvider {
    client: Client,
}

impl StockAnalysisProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let client = build_client(PROVIDER_ID, Duration::from_secs(15))?;
        Ok(Self { client })
    }

    async fn fetch_ratios(&self, slug: &str) -> Result<RawPayload, MarketDataError> {
        let url = format!("{}/{}/financials/ratios/", BASE_URL, slug);
        let request = self
            .client
            .get(&url)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9");
        let body = send_text(PROVIDER_ID, request).await?;
        Ok(RawPayload::new(PayloadShape::StockAnalysisRatios, body))
    }
}

#[async_trait]
impl MarketDataProvider for StockAnalysisProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_history: false,
            supports_info: true,
            intervals: &[],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            min_interval: Duration::from_millis(1500),
            timeout: Duration::from_secs(15),
        }
    }

    async fn fetch_series(
        &self,
        _symbol: &ProviderSymbol,
        _window: &RequestWindow,
    ) -> FetchOutcome {
        FetchOutcome::Empty
    }

    async fn fetch_info(&self, symbol: &ProviderSymbol) -> FetchOutcome {
        let ProviderSymbol::Page { path } = symbol else {
            return FetchOutcome::Empty;
        };
        debug!("Scraping stockanalysis ratios for {}", path);
        self.fetch_ratios(path).await.into()
    }
}
