//! Read-only state snapshot for end-of-run reporting.
//!
//! A [`DiagnosticsSnapshot`] is a copy. Taking one never touches the
//! manager's caches, breakers or counters.

use std::fmt;

use serde::Serialize;

use crate::models::ProviderId;
use crate::registry::ProviderBreakerState;

/// Coarse readiness label for one provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Active,
    RateLimited,
    Unavailable,
    NotConfigured,
}

impl ProviderStatus {
    /// Missing credentials win over a session failure, which wins over an
    /// open circuit.
    pub fn resolve(configured: bool, unavailable: bool, breaker: &ProviderBreakerState) -> Self {
        if !configured {
            Self::NotConfigured
        } else if unavailable {
            Self::Unavailable
        } else if breaker.circuit_open {
            Self::RateLimited
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::RateLimited => "rate_limited",
            Self::Unavailable => "unavailable",
            Self::NotConfigured => "not_configured",
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic per-provider counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ProviderStats {
    /// Adapter calls actually made, retries included.
    pub calls: u64,
    /// Cache hits served from frames this provider produced.
    pub cache_hits: u64,
    /// Calls that ended in anything other than success or empty.
    pub errors: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderDiagnostics {
    pub provider: ProviderId,
    /// Position in the price walk; `None` for enrichment-only providers.
    pub tier: Option<usize>,
    pub configured: bool,
    pub status: ProviderStatus,
    #[serde(flatten)]
    pub stats: ProviderStats,
    #[serde(flatten)]
    pub breaker: ProviderBreakerState,
    /// Reason recorded when the provider was marked unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CacheDiagnostics {
    pub single_entries: usize,
    pub batch_entries: usize,
    pub info_entries: usize,
    pub total_hits: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub providers: Vec<ProviderDiagnostics>,
    pub cache: CacheDiagnostics,
}

impl DiagnosticsSnapshot {
    pub fn provider(&self, id: &str) -> Option<&ProviderDiagnostics> {
        self.providers.iter().find(|p| p.provider == id)
    }

    /// One-line report, e.g.
    /// `ALPHA_VANTAGE=rate_limited(calls 4, errors 2) YAHOO=active(calls 9, errors 0) | cache hits 3`.
    pub fn summary(&self) -> String {
        let providers = self
            .providers
            .iter()
            .map(|p| {
                format!(
                    "{}={}(calls {}, errors {})",
                    p.provider, p.status, p.stats.calls, p.stats.errors
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} | cache hits {}", providers, self.cache.total_hits)
    }
}
