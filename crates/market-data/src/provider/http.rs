//! Shared HTTP plumbing for the adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};

use crate::errors::MarketDataError;

/// Browser user agent; several public endpoints reject library defaults.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Build a client with the provider's request timeout.
pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<Client, MarketDataError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .map_err(|e| {
            MarketDataError::Config(format!("Failed to build HTTP client for {}: {}", provider, e))
        })
}

/// Send a request and return the body text.
///
/// HTTP 429 maps to `RateLimited`, other non-2xx statuses to `ProviderError`,
/// and connect/timeout failures to `Unavailable`.
pub(crate) async fn send_text(
    provider: &str,
    request: RequestBuilder,
) -> Result<String, MarketDataError> {
    let response = request
        .send()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MarketDataError::RateLimited {
            provider: provider.to_string(),
        });
    }

    if !status.is_success() {
        return Err(MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    response
        .text()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))
}
