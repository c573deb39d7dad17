//! Frame and info sanity validation.
//!
//! Checks normalized data before it is cached:
//! - Latest close within the ticker's expected trading range
//! - Info `current_price` within the same range
//! - Soft checks on OHLC consistency and volume
//!
//! A hard failure rejects the whole result and the tier walk moves on. An
//! estimate is never substituted for a suspicious value.

use log::warn;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{CanonicalFrame, TickerInfo};
use crate::resolver::price_bounds;

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Hard failure - reject result, try next provider.
    Hard,
    /// Soft warning - accept result but log warning.
    Soft,
}

/// Validation result details.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Reject prices below `low * lower_factor`.
    pub lower_factor: f64,
    /// Reject prices above `high * upper_factor`.
    pub upper_factor: f64,
    /// Whether to warn when the latest row has zero volume.
    pub warn_on_zero_volume: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            lower_factor: 0.5,
            upper_factor: 2.0,
            warn_on_zero_volume: true,
        }
    }
}

/// Sanity validator for frames and info.
pub struct FrameValidator {
    config: ValidatorConfig,
}

impl FrameValidator {
    /// Create a new validator with default configuration.
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a frame for `ticker`.
    ///
    /// Returns `Err(Malformed)` attributed to the frame's source on a hard
    /// failure. Warnings are logged.
    pub fn validate(&self, ticker: &str, frame: &CanonicalFrame) -> Result<(), MarketDataError> {
        let mut issues: Vec<ValidationIssue> = Vec::new();

        if let Some(last) = frame.last() {
            if let Some(close) = last.close.to_f64() {
                self.validate_price_range(ticker, close, &mut issues);
            }

            if last.close < last.low || last.close > last.high {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Soft,
                    message: format!(
                        "Close ({}) is outside High/Low range ({}-{})",
                        last.close, last.low, last.high
                    ),
                });
            }
        }

        self.validate_volume(frame, &mut issues);
        self.finish(ticker, frame.source(), issues)
    }

    /// Validate info for `ticker` reported by `provider`.
    pub fn validate_info(&self, provider: &str, info: &TickerInfo) -> Result<(), MarketDataError> {
        let mut issues = Vec::new();
        if let Some(price) = info.current_price {
            self.validate_price_range(&info.symbol, price, &mut issues);
        }
        self.finish(&info.symbol, provider, issues)
    }

    /// Latest price must sit inside the loosened expected range.
    fn validate_price_range(&self, ticker: &str, price: f64, issues: &mut Vec<ValidationIssue>) {
        let Some((lo, hi)) = price_bounds(ticker) else {
            return;
        };
        let floor = lo * self.config.lower_factor;
        let ceiling = hi * self.config.upper_factor;
        if price < floor || price > ceiling {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!(
                    "Price {} outside sanity range {}-{}",
                    price, floor, ceiling
                ),
            });
        }
    }

    /// Zero volume on the latest row is suspicious only for series that
    /// otherwise carry volume.
    fn validate_volume(&self, frame: &CanonicalFrame, issues: &mut Vec<ValidationIssue>) {
        if !self.config.warn_on_zero_volume {
            return;
        }
        let has_volume = frame.rows().iter().any(|r| r.volume > Decimal::ZERO);
        if has_volume && frame.last().map(|r| r.volume) == Some(Decimal::ZERO) {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Soft,
                message: "Zero volume on latest row (market may be closed)".to_string(),
            });
        }
    }

    fn finish(
        &self,
        ticker: &str,
        provider: &str,
        issues: Vec<ValidationIssue>,
    ) -> Result<(), MarketDataError> {
        let errors: Vec<_> = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Hard)
            .map(|i| i.message.as_str())
            .collect();

        if !errors.is_empty() {
            return Err(MarketDataError::Malformed {
                provider: provider.to_string(),
                message: format!("{}: {}", ticker, errors.join("; ")),
            });
        }

        for issue in issues.iter().filter(|i| i.severity == ValidationSeverity::Soft) {
            warn!("Validation warning for {} from {}: {}", ticker, provider, issue.message);
        }

        Ok(())
    }
}

impl Default for FrameValidator {
    fn default() -> Self {
        Self::new()
    }
}
