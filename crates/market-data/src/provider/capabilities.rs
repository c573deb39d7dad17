//! Provider capabilities and rate limiting configuration.
//!
//! This module defines structures for describing what a market data provider
//! can do and how it should be rate-limited.

use std::time::Duration;

/// Describes the capabilities of a market data provider.
///
/// Used by the manager to decide whether a tier can take part in a price
/// or info walk at all.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Whether the provider serves time series.
    pub supports_history: bool,

    /// Whether the provider serves descriptive/fundamental attributes.
    pub supports_info: bool,

    /// Interval tokens the provider understands (e.g. "1d", "1wk").
    pub intervals: &'static [&'static str],
}

impl ProviderCapabilities {
    pub fn supports_interval(&self, interval: &str) -> bool {
        self.intervals.iter().any(|i| *i == interval)
    }
}

/// Rate limiting configuration for a provider.
///
/// Controls how aggressively we can call a provider to avoid
/// hitting their rate limits and getting blocked.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Minimum spacing between two consecutive calls.
    pub min_interval: Duration,

    /// Request timeout for a single call.
    pub timeout: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_interval() {
        let caps = ProviderCapabilities {
            supports_history: true,
            supports_info: false,
            intervals: &["1d", "1wk"],
        };
        assert!(caps.supports_interval("1d"));
        assert!(!caps.supports_interval("1h"));
    }
}
