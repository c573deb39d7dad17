//! Reportdesk Market Data Crate
//!
//! This crate fetches time-series market data and ticker attributes from
//! several unreliable, rate-limited providers and hands callers one uniform
//! result, whichever provider actually answered.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Equities, ETFs, indices, crypto, FX and macro series
//! - Tiered fallback: Alpha Vantage, Yahoo, FRED, Eastmoney, CoinGecko,
//!   Google Finance, with stockanalysis for fundamentals enrichment
//! - Symbol translation per provider, with a memoized probe for unknown codes
//! - Minimum call spacing and a one-shot circuit breaker per provider
//! - A session cache with exact, superset and single-ticker lookups
//! - Macro snapshots and a net liquidity trend from FRED series
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |     Caller       | --> | MarketDataManager|  (get_prices / get_info)
//! +------------------+     +------------------+
//!                                  |
//!                          +-------+--------+
//!                          |                |
//!                          v                v
//!                  +--------------+  +--------------+
//!                  |  CacheStore  |  | Tier walk    |  (breaker, spacing)
//!                  +--------------+  +--------------+
//!                                           |
//!                                           v
//!                                  +------------------+
//!                                  | SymbolTranslator |  (Symbol / Probe / NoMapping)
//!                                  +------------------+
//!                                           |
//!                                           v
//!                                  +------------------+
//!                                  |    Provider      |  (-> FetchOutcome)
//!                                  +------------------+
//!                                           |
//!                                           v
//!                                  +------------------+
//!                                  |   Normalizer     |  (-> CanonicalFrame)
//!                                  +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataManager`] - Session-scoped orchestrator
//! - [`CanonicalFrame`] - Sorted, deduplicated OHLCV rows for one ticker
//! - [`PriceTable`] - Frames keyed by ticker
//! - [`TickerInfo`] - Descriptive and fundamental attributes
//! - [`MacroSnapshot`] - Latest macro readings
//! - [`FetchOutcome`] - What a provider call produced
//! - [`DiagnosticsSnapshot`] - Counters and breaker state for reporting
//!
//! # Example
//!
//! ```ignore
//! use reportdesk_market_data::{FeedConfig, MarketDataManager};
//!
//! let config = FeedConfig::from_env()?;
//! let mut manager = MarketDataManager::from_config(&config)?;
//!
//! let prices = manager.get_prices(&["AAPL", "MSFT"], "5d", "1d").await;
//! let info = manager.get_info("AAPL").await;
//! println!("{}", manager.diagnostics().summary());
//! ```

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod telemetry;

// Re-export all public types from models
pub use models::{
    Bar, CanonicalFrame, Currency, InfoSource, LiquidityPoint, MacroSnapshot, PriceField,
    PriceTable, ProviderId, ProviderSymbol, RequestWindow, Ticker, TickerInfo,
};

pub use cache::{BatchKey, CacheStore, SingleKey};
pub use config::{FeedConfig, FeedConfigError};
pub use diagnostics::{DiagnosticsSnapshot, ProviderDiagnostics, ProviderStats, ProviderStatus};
pub use errors::{MarketDataError, RetryClass};

// Re-export provider types
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::eastmoney::EastmoneyProvider;
pub use provider::fred::FredProvider;
pub use provider::google_finance::GoogleFinanceProvider;
pub use provider::stock_analysis::StockAnalysisProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{
    FetchOutcome, MarketDataProvider, PayloadShape, ProviderCapabilities, RateLimit, RawPayload,
};

pub use registry::{
    FetchDiagnostics, ManagerSettings, MarketDataManager, PreloadGroup, ProviderBreakerState,
    SkipReason, MACRO_PERIOD,
};
pub use resolver::{SymbolMapping, SymbolTranslator};
