//! Minimum-interval rate limiter for market data providers.
//!
//! Each provider has a fixed minimum spacing between calls. A caller that
//! asks for a slot sleeps until the spacing since the provider's previous
//! call has elapsed. The backoff for the single rate-limit retry also lives
//! here.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::Rng;

/// Per-provider spacing enforcement.
pub struct RateLimiter {
    /// Minimum spacing per provider.
    intervals: Mutex<HashMap<String, Duration>>,
    /// Time each provider's last slot was granted.
    last_call: Mutex<HashMap<String, Instant>>,
    /// Multiplier applied to every interval (0 disables spacing).
    scale: f64,
}

impl RateLimiter {
    /// Create a rate limiter with unscaled intervals.
    pub fn new() -> Self {
        Self::with_scale(1.0)
    }

    /// Create a rate limiter whose intervals are multiplied by `scale`.
    pub fn with_scale(scale: f64) -> Self {
        Self {
            intervals: Mutex::new(HashMap::new()),
            last_call: Mutex::new(HashMap::new()),
            scale: if scale.is_finite() { scale.max(0.0) } else { 1.0 },
        }
    }

    /// Lock the intervals mutex, recovering from poison if necessary.
    fn lock_intervals(&self) -> MutexGuard<'_, HashMap<String, Duration>> {
        self.intervals.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter intervals mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Lock the last-call mutex, recovering from poison if necessary.
    fn lock_last_call(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.last_call.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter last-call mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set the minimum spacing for a provider.
    pub fn configure(&self, provider: &str, min_interval: Duration) {
        self.lock_intervals()
            .insert(provider.to_string(), min_interval.mul_f64(self.scale));
    }

    /// Effective spacing for a provider (zero when unconfigured).
    pub fn interval(&self, provider: &str) -> Duration {
        self.lock_intervals()
            .get(provider)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Time left before the provider's next slot.
    pub fn time_until_slot(&self, provider: &str) -> Duration {
        let interval = self.interval(provider);
        match self.lock_last_call().get(provider) {
            Some(last) => interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Wait until the provider's minimum spacing has elapsed, then claim the slot.
    pub async fn await_slot(&self, provider: &str) {
        let wait_time = self.time_until_slot(provider);
        if wait_time > Duration::ZERO {
            debug!(
                "Rate limiter: waiting {:?} for provider '{}'",
                wait_time, provider
            );
            tokio::time::sleep(wait_time).await;
        }
        self.lock_last_call()
            .insert(provider.to_string(), Instant::now());
    }

    /// Forget every provider's last call time. Intervals are kept.
    pub fn reset(&self) {
        self.lock_last_call().clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Backoff before the single rate-limit retry: `base` plus a uniform jitter
/// drawn from `jitter`.
pub fn retry_backoff(base: Duration, jitter: (Duration, Duration)) -> Duration {
    let (lo, hi) = jitter;
    if hi <= lo {
        return base + lo;
    }
    let extra = rand::thread_rng().gen_range(lo.as_secs_f64()..hi.as_secs_f64());
    base + Duration::from_secs_f64(extra)
}
