//! Market data providers.
//!
//! Each provider is one fallback tier. Providers differ in transport and
//! native payload shape but share the [`MarketDataProvider`] contract and
//! report a [`FetchOutcome`] instead of raising errors.

pub mod alpha_vantage;
pub mod capabilities;
pub mod coingecko;
pub mod eastmoney;
pub mod fred;
pub mod google_finance;
mod http;
pub mod outcome;
pub mod stock_analysis;
pub mod traits;
pub mod yahoo;

pub use capabilities::{ProviderCapabilities, RateLimit};
pub use outcome::{FetchOutcome, PayloadShape, RawPayload};
pub use traits::MarketDataProvider;
