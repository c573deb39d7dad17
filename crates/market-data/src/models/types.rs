use std::borrow::Cow;
use std::sync::Arc;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Canonical ticker in the caller-facing vocabulary (e.g. "AAPL", "^GSPC", "BTC-USD")
pub type Ticker = Arc<str>;

/// Currency code (ISO 4217) - mostly static
pub type Currency = Cow<'static, str>;
