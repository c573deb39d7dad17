use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of trading days when a period token is not recognised.
const DEFAULT_TRADING_DAYS: usize = 66;

/// Default number of calendar days when a period token is not recognised.
const DEFAULT_CALENDAR_DAYS: u32 = 90;

/// Time window of a price request: `(period, interval)`.
///
/// Both tokens are opaque to the cache and the manager, which only compare
/// them for equality. Adapters translate them into provider parameters with
/// [`trading_days`](Self::trading_days) and [`calendar_days`](Self::calendar_days).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestWindow {
    pub period: String,
    pub interval: String,
}

impl RequestWindow {
    pub fn new(period: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            interval: interval.into(),
        }
    }

    /// Daily sampling over the given period.
    pub fn daily(period: impl Into<String>) -> Self {
        Self::new(period, "1d")
    }

    pub fn is_daily(&self) -> bool {
        self.interval == "1d"
    }

    /// Approximate number of trading sessions covered by the period.
    ///
    /// `"5d"` -> 5, `"3mo"` -> 66, `"1y"` -> 252.
    pub fn trading_days(&self) -> usize {
        let period = self.period.trim().to_ascii_lowercase();
        match period.as_str() {
            "ytd" => return 126,
            "max" => return 2520,
            _ => {}
        }

        if let Some(n) = leading_count(&period, "mo") {
            return n.saturating_mul(22);
        }
        if let Some(n) = leading_count(&period, "d") {
            return n;
        }
        if let Some(n) = leading_count(&period, "y") {
            return n.saturating_mul(252);
        }
        DEFAULT_TRADING_DAYS
    }

    /// Approximate number of calendar days covered by the period.
    pub fn calendar_days(&self) -> u32 {
        let period = self.period.trim().to_ascii_lowercase();
        let days = if let Some(n) = leading_count(&period, "mo") {
            n.saturating_mul(30)
        } else if let Some(n) = leading_count(&period, "d") {
            n
        } else if let Some(n) = leading_count(&period, "y") {
            n.saturating_mul(365)
        } else {
            return DEFAULT_CALENDAR_DAYS;
        };
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for RequestWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.period, self.interval)
    }
}

/// Parses `"<n><suffix>"` into `n`, rejecting zero.
fn leading_count(token: &str, suffix: &str) -> Option<usize> {
    token
        .strip_suffix(suffix)
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n > 0)
}
