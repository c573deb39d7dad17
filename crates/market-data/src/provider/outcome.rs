//! Adapter outcomes and raw payloads.
//!
//! Every adapter call returns a [`FetchOutcome`] by value. The manager
//! switches on [`FetchOutcome::retry_class`] instead of matching errors.

use std::fmt;

use chrono::NaiveDate;

use crate::errors::{MarketDataError, RetryClass};

/// Native payload shape, used by the normalizer to pick a parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadShape {
    AlphaVantageDaily,
    AlphaVantageCrypto,
    AlphaVantageFx,
    /// `{"overview": OVERVIEW, "quote": GLOBAL_QUOTE}`
    AlphaVantageInfo,
    YahooChart,
    YahooQuoteSummary,
    EastmoneyKline,
    CoinGeckoMarketChart,
    FredObservations,
    /// Quote page HTML; the single row is dated `as_of`.
    GoogleFinanceQuote { as_of: NaiveDate },
    StockAnalysisRatios,
}

/// Undecoded provider response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawPayload {
    pub shape: PayloadShape,
    pub body: String,
    /// Keep only the most recent N rows after normalizing.
    pub row_limit: Option<usize>,
}

impl RawPayload {
    pub fn new(shape: PayloadShape, body: impl Into<String>) -> Self {
        Self {
            shape,
            body: body.into(),
            row_limit: None,
        }
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = Some(limit);
        self
    }
}

/// Result of one adapter call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(RawPayload),
    /// Reachable, valid query, zero usable rows.
    Empty,
    RateLimited,
    QuotaExhausted,
    /// Transport or dependency failure.
    Unavailable(String),
    /// Payload received but unusable.
    Malformed(String),
}

impl FetchOutcome {
    /// Returns the retry classification for this outcome.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Success(_) => RetryClass::Done,
            Self::Empty | Self::Malformed(_) => RetryClass::NextProvider,
            Self::RateLimited => RetryClass::RetryThenPenalty,
            Self::QuotaExhausted => RetryClass::TripCircuit,
            Self::Unavailable(_) => RetryClass::DisableProvider,
        }
    }

    /// Whether this outcome counts as an error in provider stats.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Success(_) | Self::Empty)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Empty => "empty",
            Self::RateLimited => "rate_limited",
            Self::QuotaExhausted => "quota_exhausted",
            Self::Unavailable(_) => "unavailable",
            Self::Malformed(_) => "malformed",
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) | Self::Malformed(msg) => write!(f, "{}: {}", self.label(), msg),
            _ => f.write_str(self.label()),
        }
    }
}

impl From<MarketDataError> for FetchOutcome {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::NoData(_) | MarketDataError::ProviderError { .. } => Self::Empty,
            MarketDataError::RateLimited { .. } => Self::RateLimited,
            MarketDataError::QuotaExhausted { .. } => Self::QuotaExhausted,
            MarketDataError::Unavailable { message, .. } => Self::Unavailable(message),
            MarketDataError::Config(message) => Self::Unavailable(message),
            MarketDataError::Malformed { message, .. } => Self::Malformed(message),
        }
    }
}

impl From<Result<RawPayload, MarketDataError>> for FetchOutcome {
    fn from(result: Result<RawPayload, MarketDataError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(err) => err.into(),
        }
    }
}
