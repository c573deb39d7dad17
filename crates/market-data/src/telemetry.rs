//! Tracing subscriber setup for binaries and tests that embed the engine.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FORMAT_VAR: &str = "MARKET_DATA_LOG_FORMAT";

/// Install the global subscriber, panicking if one is already set.
///
/// `RUST_LOG` controls the filter (default `info`); set
/// `MARKET_DATA_LOG_FORMAT=json` for structured output.
pub fn init_tracing() {
    let log_format = std::env::var(LOG_FORMAT_VAR).unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Like [`init_tracing`], but returns an error instead of panicking when a
/// global subscriber is already installed.
pub fn try_init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    let log_format = std::env::var(LOG_FORMAT_VAR).unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    }
}
