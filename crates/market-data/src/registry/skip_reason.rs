//! Skip reason tracking for the tier walk.

use std::fmt;

use crate::models::ProviderId;

/// Why a tier was skipped without a network call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Translator returned the NoMapping sentinel.
    NoMapping,

    /// Provider does not serve this interval token.
    IntervalNotSupported,

    /// Provider has no info endpoint.
    InfoNotSupported,

    /// Circuit breaker is open for this provider.
    CircuitBreakerOpen,

    /// Provider was marked unavailable earlier in the session.
    Unavailable,

    /// Provider credential is missing.
    NotConfigured,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Record of a single provider attempt during a fetch.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    pub success: bool,
}

/// Attempt trail for one ticker's tier walk.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
    /// Set when the ticker was served from cache.
    pub cache_hit: Option<ProviderId>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: Some(reason),
            error: None,
            success: false,
        });
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: None,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, provider_id: ProviderId) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: None,
            error: None,
            success: true,
        });
    }

    pub fn record_cache_hit(&mut self, source: ProviderId) {
        self.cache_hit = Some(source);
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        if let Some(source) = &self.cache_hit {
            return format!("CACHE: HIT ({})", source);
        }
        if self.attempts.is_empty() {
            return "NO TIERS".to_string();
        }
        self.attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("{}: SUCCESS", a.provider_id)
                } else if let Some(skip) = &a.skipped {
                    format!("{}: SKIPPED ({})", a.provider_id, skip)
                } else if let Some(err) = &a.error {
                    format!("{}: ERROR ({})", a.provider_id, err)
                } else {
                    format!("{}: UNKNOWN", a.provider_id)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Check if any provider succeeded.
    pub fn has_success(&self) -> bool {
        self.cache_hit.is_some() || self.attempts.iter().any(|a| a.success)
    }

    /// Get all skip reasons.
    pub fn skip_reasons(&self) -> Vec<(&ProviderId, &SkipReason)> {
        self.attempts
            .iter()
            .filter_map(|a| a.skipped.as_ref().map(|s| (&a.provider_id, s)))
            .collect()
    }

    /// Providers actually called, in order.
    pub fn called(&self) -> Vec<&ProviderId> {
        self.attempts
            .iter()
            .filter(|a| a.skipped.is_none())
            .map(|a| &a.provider_id)
            .collect()
    }
}
