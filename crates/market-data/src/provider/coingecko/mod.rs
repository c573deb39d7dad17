//! CoinGecko crypto fallback provider.
//!
//! Daily `market_chart` prices for coins, and fiat rates through tether
//! quoted in the target currency (`CNY=X` -> tether/cny).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RequestWindow};
use crate::provider::http::{build_client, send_text};
use crate::provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

pub const PROVIDER_ID: &str = "COINGECKO";

const BASE_URL: &str = "https://api.coingecko.com/api/v3/coins";

pub struct CoinGeckoProvider {
    client: Client,
}

impl CoinGeckoProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let client = build_client(PROVIDER_ID, Duration::from_secs(15))?;
        Ok(Self { client })
    }

    async fn fetch_market_chart(
        &self,
        id: &str,
        vs_currency: &str,
        window: &RequestWindow,
    ) -> Result<RawPayload, MarketDataError> {
        let url = format!("{}/{}/market_chart", BASE_URL, encode(id));
        let days = window.calendar_days().to_string();
        let request = self.client.get(&url).query(&[
            ("vs_currency", vs_currency),
            ("days", days.as_str()),
            ("interval", "daily"),
        ]);

        let body = send_text(PROVIDER_ID, request).await?;
        Ok(RawPayload::new(PayloadShape::CoinGeckoMarketChart, body)
            .with_row_limit(window.trading_days()))
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
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
            timeout: Duration::from_secs(15),
        }
    }

    async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome {
        let ProviderSymbol::CoinId { id, vs_currency } = symbol else {
            return FetchOutcome::Empty;
        };
        debug!("Fetching {} in {} ({}) from CoinGecko", id, vs_currency, window);
        self.fetch_market_chart(id, vs_currency, window).await.into()
    }
}
