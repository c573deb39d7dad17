//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Type aliases for common identifiers (ProviderId, Ticker, Currency)
//! - `provider_params` - Provider-specific symbol parameters (ProviderSymbol)
//! - `window` - Request window tokens (RequestWindow)
//! - `frame` - Canonical OHLCV series (Bar, CanonicalFrame)
//! - `table` - Multi-ticker results (PriceTable)
//! - `info` - Descriptive and fundamental attributes (TickerInfo)
//! - `macro_snapshot` - Latest macro readings and net liquidity (MacroSnapshot)

mod frame;
mod info;
mod macro_snapshot;
mod provider_params;
mod table;
mod types;
mod window;

pub use frame::{finite_decimal, Bar, CanonicalFrame};
pub use info::{InfoSource, TickerInfo};
pub use macro_snapshot::{
    liquidity_trend, macro_ticker, net_liquidity, snapshot_tickers, LiquidityPoint, MacroSnapshot,
    CORE_PCE_INDEX, FED_BALANCE_SHEET, OVERNIGHT_REVERSE_REPO, TREASURY_GENERAL_ACCOUNT,
};
pub use provider_params::ProviderSymbol;
pub use table::{PriceField, PriceTable};
pub use types::{Currency, ProviderId, Ticker};
pub use window::RequestWindow;
