//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum used inside provider adapters
//! - [`RetryClass`]: Classification for determining retry behavior
//!
//! Adapter errors never reach callers of the manager. They are folded into a
//! [`FetchOutcome`](crate::provider::FetchOutcome) at the adapter boundary.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur inside a provider adapter.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// Provider answered but had no rows for the symbol/window.
    #[error("No data: {0}")]
    NoData(String),

    /// The provider rate limited the request (HTTP 429, call frequency notice).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider reported that its daily quota is used up.
    #[error("Quota exhausted: {provider}")]
    QuotaExhausted {
        /// The provider whose quota is exhausted
        provider: String,
    },

    /// The provider could not be reached (DNS, connect, timeout).
    #[error("Provider unavailable: {provider} - {message}")]
    Unavailable {
        /// The unreachable provider
        provider: String,
        /// Transport error description
        message: String,
    },

    /// A body was received but could not be decoded.
    #[error("Malformed payload from {provider}: {message}")]
    Malformed {
        /// The provider that returned the payload
        provider: String,
        /// Decoding error description
        message: String,
    },

    /// A provider-specific error occurred (non-2xx status, error message).
    /// Try the next provider in the chain.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// Missing or invalid configuration (credentials, HTTP client setup).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarketDataError {
    /// Classify a `reqwest` transport error for the given provider.
    ///
    /// Connect and timeout failures mean the provider is unreachable;
    /// anything else is a plain provider error.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Unavailable {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }
}
