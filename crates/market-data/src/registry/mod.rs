//! Provider orchestration.
//!
//! This module provides the fallback walk over market data providers,
//! including:
//! - Minimum call spacing per provider
//! - One-shot circuit breaking on quota exhaustion
//! - Sanity validation of normalized data
//! - Per-ticker attempt trails
//! - Macro snapshots and the net liquidity trend over `FRED:` series

mod circuit_breaker;
mod macro_data;
mod manager;
mod preload;
mod rate_limiter;
mod skip_reason;
mod validator;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, ProviderBreakerState, DEFAULT_EXHAUSTION_THRESHOLD,
};
pub use macro_data::MACRO_PERIOD;
pub use manager::{ManagerSettings, MarketDataManager};
pub use preload::PreloadGroup;
pub use rate_limiter::{retry_backoff, RateLimiter};
pub use skip_reason::{FetchDiagnostics, ProviderAttempt, SkipReason};
pub use validator::{FrameValidator, ValidationIssue, ValidationSeverity, ValidatorConfig};
