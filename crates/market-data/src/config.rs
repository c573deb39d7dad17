//! Environment-driven configuration.
//!
//! Credentials and a handful of runtime knobs are read from the process
//! environment. A `.env` file in the working directory is loaded first when
//! present.

use std::time::Duration;

use thiserror::Error;

use crate::registry::{ManagerSettings, DEFAULT_EXHAUSTION_THRESHOLD};

pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_KEY";
pub const FRED_API_KEY_VAR: &str = "FRED_API_KEY";
pub const HTTP_TIMEOUT_VAR: &str = "MARKET_DATA_HTTP_TIMEOUT_SECS";
pub const RETRY_BACKOFF_VAR: &str = "MARKET_DATA_RETRY_BACKOFF_SECS";
pub const BREAKER_THRESHOLD_VAR: &str = "MARKET_DATA_BREAKER_THRESHOLD";

const DEFAULT_RETRY_BACKOFF_SECS: u64 = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be at least 1")]
    ZeroThreshold { var: &'static str },
}

/// Feed configuration for one reporting run.
#[derive(Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub alpha_vantage_key: Option<String>,
    pub fred_api_key: Option<String>,
    /// Overrides every provider's per-request timeout when set.
    pub http_timeout: Option<Duration>,
    pub retry_backoff: Duration,
    pub exhaustion_threshold: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_key: None,
            fred_api_key: None,
            http_timeout: None,
            retry_backoff: Duration::from_secs(DEFAULT_RETRY_BACKOFF_SECS),
            exhaustion_threshold: DEFAULT_EXHAUSTION_THRESHOLD,
        }
    }
}

impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("alpha_vantage_key", &self.alpha_vantage_key.as_ref().map(|_| "***"))
            .field("fred_api_key", &self.fred_api_key.as_ref().map(|_| "***"))
            .field("http_timeout", &self.http_timeout)
            .field("retry_backoff", &self.retry_backoff)
            .field("exhaustion_threshold", &self.exhaustion_threshold)
            .finish()
    }
}

impl FeedConfig {
    /// Load `.env` (if any) and read the configuration from the environment.
    pub fn from_env() -> Result<Self, FeedConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FeedConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_timeout = read_secs(&lookup, HTTP_TIMEOUT_VAR)?.map(Duration::from_secs);
        let retry_backoff = Duration::from_secs(
            read_secs(&lookup, RETRY_BACKOFF_VAR)?.unwrap_or(DEFAULT_RETRY_BACKOFF_SECS),
        );

        let exhaustion_threshold = match read_secs(&lookup, BREAKER_THRESHOLD_VAR)? {
            Some(0) => {
                return Err(FeedConfigError::ZeroThreshold {
                    var: BREAKER_THRESHOLD_VAR,
                })
            }
            Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
            None => DEFAULT_EXHAUSTION_THRESHOLD,
        };

        Ok(Self {
            alpha_vantage_key: credential(ALPHA_VANTAGE_KEY_VAR),
            fred_api_key: credential(FRED_API_KEY_VAR),
            http_timeout,
            retry_backoff,
            exhaustion_threshold,
        })
    }

    /// Manager knobs derived from this configuration.
    pub fn to_settings(&self) -> ManagerSettings {
        ManagerSettings {
            exhaustion_threshold: self.exhaustion_threshold,
            retry_backoff: self.retry_backoff,
            call_timeout: self.http_timeout,
            ..ManagerSettings::default()
        }
    }
}

fn read_secs<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, FeedConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var).map(|v| v.trim().to_string()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => v
            .parse::<u64>()
            .map(Some)
            .map_err(|_| FeedConfigError::InvalidNumber { var, value: v }),
    }
}
