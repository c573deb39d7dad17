//! Eastmoney regional market data provider.
//!
//! Serves US listings through the push2his kline endpoint, addressed by an
//! exchange-coded `secid`: `105.` NASDAQ, `106.` NYSE, `107.` NYSE Arca.
//! Codes for unknown tickers are probed by the manager and memoized by the
//! translator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{ProviderSymbol, RequestWindow};
use crate::provider::http::{build_client, send_text};
use crate::provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

pub const PROVIDER_ID: &str = "EASTMONEY";

const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// Eastmoney kline provider.
pub struct EastmoneyProvider {
    client: Client,
}

impl EastmoneyProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let client = build_client(PROVIDER_ID, Duration::from_secs(15))?;
        Ok(Self { client })
    }

    /// Kline type for an interval token.
    fn kline_type(interval: &str) -> Option<&'static str> {
        match interval {
            "1d" => Some("101"),
            "1wk" => Some("102"),
            "1mo" => Some("103"),
            _ => None,
        }
    }

    async fn fetch_klines(
        &self,
        code: &str,
        window: &RequestWindow,
    ) -> Result<RawPayload, MarketDataError> {
        let klt = Self::kline_type(&window.interval)
            .ok_or_else(|| MarketDataError::NoData(format!("interval {}", window.interval)))?;
        let limit = window.trading_days().to_string();

        let request = self.client.get(KLINE_URL).query(&[
            ("secid", code),
            ("fields1", "f1,f2,f3,f4,f5,f6"),
            ("fields2", "f51,f52,f53,f54,f55,f56,f57"),
            ("klt", klt),
            ("fqt", "1"),
            ("end", "20500101"),
            ("lmt", limit.as_str()),
        ]);

        let body = send_text(PROVIDER_ID, request).await?;
        Ok(RawPayload::new(PayloadShape::EastmoneyKline, body)
            .with_row_limit(window.trading_days()))
    }
}

#[async_trait]
impl MarketDataProvider for EastmoneyProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_history: true,
            supports_info: false,
            intervals: &["1d", "1wk", "1mo"],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            min_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
        }
    }

    async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome {
        let ProviderSymbol::Regional { code } = symbol else {
            return FetchOutcome::Empty;
        };
        debug!("Fetching {} ({}) from Eastmoney", code, window);
        self.fetch_klines(code, window).await.into()
    }
}
