//! FRED macro series provider.
//!
//! Serves `FRED:<SERIES>` tickers and the treasury yield indices
//! (`^TNX`, `^FVX`, `^IRX`, `^TYX`) that have no ETF proxy elsewhere.
//! Requires `FRED_API_KEY`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Utc};
use reqwest::Client;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RequestWindow};
use crate::provider::http::{build_client, send_text};
use crate::provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

pub const PROVIDER_ID: &str = "FRED";

const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

pub struct FredProvider {
    client: Client,
    api_key: Option<String>,
}

impl FredProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, MarketDataError> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        let client = build_client(PROVIDER_ID, Duration::from_secs(15))?;
        Ok(Self { client, api_key })
    }

    async fn fetch_observations(
        &self,
        series_id: &str,
        window: &RequestWindow,
    ) -> Result<RawPayload, MarketDataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::Config("FRED_API_KEY is not set".to_string()))?;

        // Calendar span plus slack for weekends and holidays.
        let span = u64::from(window.calendar_days()) * 3 / 2 + 7;
        let start = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(span))
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        debug!(
            "FRED request: series_id={} observation_start={}",
            series_id, start
        );

        let request = self.client.get(OBSERVATIONS_URL).query(&[
            ("series_id", series_id),
            ("api_key", api_key),
            ("file_type", "json"),
            ("observation_start", start.as_str()),
        ]);

        let body = send_text(PROVIDER_ID, request).await?;
        Ok(RawPayload::new(PayloadShape::FredObservations, body)
            .with_row_limit(window.trading_days()))
    }
}

#[async_trait]
impl MarketDataProvider for FredProvider {
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
            min_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome {
        let ProviderSymbol::Series { id } = symbol else {
            return FetchOutcome::Empty;
        };
        self.fetch_observations(id, window).await.into()
    }
}
