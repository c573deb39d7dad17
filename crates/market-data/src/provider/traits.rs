//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! market data providers must implement.

use async_trait::async_trait;

use crate::models::{ProviderSymbol, RequestWindow};

use super::capabilities::{ProviderCapabilities, RateLimit};
use super::outcome::FetchOutcome;

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source.
/// The manager walks providers in list order, so adding, removing or
/// reordering tiers is a change to that list only.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use reportdesk_market_data::provider::{
///     FetchOutcome, MarketDataProvider, ProviderCapabilities, RateLimit,
/// };
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             supports_history: true,
///             supports_info: false,
///             intervals: &["1d"],
///         }
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::default()
///     }
///
///     async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome {
///         FetchOutcome::Empty
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO", "ALPHA_VANTAGE", etc.
    /// Used for logging, breaker tracking, stats and symbol translation.
    fn id(&self) -> &'static str;

    /// Describes what this provider can do.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Spacing and timeout that should be applied when calling this provider.
    fn rate_limit(&self) -> RateLimit;

    /// Whether the provider has the credentials it needs.
    ///
    /// An unconfigured provider is skipped for the whole session.
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetch a time series for one provider symbol over one window.
    async fn fetch_series(&self, symbol: &ProviderSymbol, window: &RequestWindow) -> FetchOutcome;

    /// Fetch descriptive/fundamental attributes for one provider symbol.
    ///
    /// Providers without an info endpoint keep the default, which reports
    /// nothing found.
    async fn fetch_info(&self, _symbol: &ProviderSymbol) -> FetchOutcome {
        FetchOutcome::Empty
    }
}
