//! Per-provider one-shot circuit breaker.
//!
//! Exhaustion signals from a provider usually mean a daily quota, not a
//! transient blip. The circuit therefore has only two states:
//!
//! - **Closed**: requests are allowed through.
//! - **Open**: the provider is skipped for the rest of the session.
//!
//! An open circuit never closes on its own. Only [`CircuitBreaker::reset_all`]
//! returns it to the initial state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};
use serde::Serialize;

use crate::errors::RetryClass;
use crate::provider::FetchOutcome;

/// Default number of consecutive exhaustion signals before opening.
pub const DEFAULT_EXHAUSTION_THRESHOLD: u32 = 2;

/// Breaker state for a single provider.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ProviderBreakerState {
    /// Rate-limit signals since the last success.
    pub consecutive_exhaustion_count: u32,
    /// Once true, stays true until reset.
    pub circuit_open: bool,
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive exhaustion signals that open the circuit.
    pub exhaustion_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            exhaustion_threshold: DEFAULT_EXHAUSTION_THRESHOLD,
        }
    }
}

/// Per-provider circuit breaker.
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, ProviderBreakerState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default settings.
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Create a circuit breaker with custom configuration.
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lock the circuits mutex, recovering from poison if necessary.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<String, ProviderBreakerState>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// True once the provider's circuit has tripped.
    pub fn is_open(&self, provider: &str) -> bool {
        self.state(provider).circuit_open
    }

    /// Update breaker state from an adapter outcome.
    ///
    /// Outcomes that say nothing about quota (Empty, Unavailable, Malformed)
    /// leave the state untouched.
    pub fn record_outcome(&self, provider: &str, outcome: &FetchOutcome) {
        match outcome.retry_class() {
            RetryClass::Done => self.record_success(provider),
            RetryClass::RetryThenPenalty => self.record_exhaustion(provider),
            RetryClass::TripCircuit => self.trip(provider),
            RetryClass::NextProvider | RetryClass::DisableProvider => {}
        }
    }

    /// Reset the consecutive count after any success.
    pub fn record_success(&self, provider: &str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider.to_string()).or_default();
        if circuit.consecutive_exhaustion_count > 0 {
            debug!(
                "Circuit breaker: success for '{}', exhaustion count reset",
                provider
            );
        }
        circuit.consecutive_exhaustion_count = 0;
    }

    /// Count one exhaustion signal. Opens the circuit at the threshold.
    pub fn record_exhaustion(&self, provider: &str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider.to_string()).or_default();
        if circuit.circuit_open {
            return;
        }

        circuit.consecutive_exhaustion_count += 1;
        if circuit.consecutive_exhaustion_count >= self.config.exhaustion_threshold {
            info!(
                "Circuit breaker: opening circuit for '{}' after {} exhaustion signals",
                provider, circuit.consecutive_exhaustion_count
            );
            circuit.circuit_open = true;
        } else {
            debug!(
                "Circuit breaker: exhaustion signal for '{}' ({}/{})",
                provider, circuit.consecutive_exhaustion_count, self.config.exhaustion_threshold
            );
        }
    }

    /// Open the circuit immediately (hard quota signal).
    pub fn trip(&self, provider: &str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider.to_string()).or_default();
        if !circuit.circuit_open {
            info!("Circuit breaker: quota exhausted for '{}', opening circuit", provider);
        }
        circuit.consecutive_exhaustion_count += 1;
        circuit.circuit_open = true;
    }

    /// Snapshot of one provider's state.
    pub fn state(&self, provider: &str) -> ProviderBreakerState {
        self.lock_circuits()
            .get(provider)
            .copied()
            .unwrap_or_default()
    }

    /// Reset all circuits to their initial state.
    pub fn reset_all(&self) {
        self.lock_circuits().clear();
        info!("Circuit breaker: all circuits reset");
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{PayloadShape, RawPayload};

    #[test]
    fn test_circuit_starts_closed() {
        let cb = CircuitBreaker::new();
        assert!(!cb.is_open("TEST_PROVIDER"));
        assert_eq!(cb.state("TEST_PROVIDER"), ProviderBreakerState::default());
    }

    #[test]
    fn test_circuit_opens_at_threshold() {
        let cb = CircuitBreaker::new();

        cb.record_exhaustion("ALPHA_VANTAGE");
        assert!(!cb.is_open("ALPHA_VANTAGE"));

        cb.record_exhaustion("ALPHA_VANTAGE");
        assert!(cb.is_open("ALPHA_VANTAGE"));
        assert_eq!(cb.state("ALPHA_VANTAGE").consecutive_exhaustion_count, 2);
    }

    #[test]
    fn test_success_resets_count() {
        let cb = CircuitBreaker::new();

        cb.record_exhaustion("YAHOO");
        cb.record_success("YAHOO");
        cb.record_exhaustion("YAHOO");
        assert!(!cb.is_open("YAHOO"));
        assert_eq!(cb.state("YAHOO").consecutive_exhaustion_count, 1);
    }

    #[test]
    fn test_open_circuit_never_closes_on_success() {
        let cb = CircuitBreaker::new();
        cb.trip("ALPHA_VANTAGE");
        cb.record_success("ALPHA_VANTAGE");
        assert!(cb.is_open("ALPHA_VANTAGE"));
    }

    #[test]
    fn test_record_outcome_dispatch() {
        let cb = CircuitBreaker::with_config(CircuitBreakerConfig {
            exhaustion_threshold: 3,
        });

        cb.record_outcome("A", &FetchOutcome::Empty);
        cb.record_outcome("A", &FetchOutcome::Unavailable("dns".into()));
        assert_eq!(cb.state("A"), ProviderBreakerState::default());

        cb.record_outcome("A", &FetchOutcome::RateLimited);
        assert_eq!(cb.state("A").consecutive_exhaustion_count, 1);

        let payload = RawPayload::new(PayloadShape::YahooChart, "{}");
        cb.record_outcome("A", &FetchOutcome::Success(payload));
        assert_eq!(cb.state("A").consecutive_exhaustion_count, 0);

        cb.record_outcome("A", &FetchOutcome::QuotaExhausted);
        assert!(cb.is_open("A"));
    }

    #[test]
    fn test_provider_isolation_and_reset() {
        let cb = CircuitBreaker::new();
        cb.trip("PROVIDER_A");
        assert!(!cb.is_open("PROVIDER_B"));

        cb.reset_all();
        assert!(!cb.is_open("PROVIDER_A"));
    }
}
