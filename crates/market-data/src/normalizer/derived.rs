//! Ticker info derived from a daily price frame.

use num_traits::ToPrimitive;

use crate::models::{CanonicalFrame, InfoSource, TickerInfo};

/// Build price-only info from the last two closes of `frame`.
///
/// Needs at least two rows; a single row cannot give a previous close.
pub fn info_from_frame(
    ticker: &str,
    frame: &CanonicalFrame,
    name: Option<&str>,
) -> Option<TickerInfo> {
    let rows = frame.rows();
    if rows.len() < 2 {
        return None;
    }
    let price = rows[rows.len() - 1].close.to_f64()?;
    let previous = rows[rows.len() - 2].close.to_f64()?;

    let mut info = TickerInfo::new(ticker);
    info.source = Some(InfoSource::PriceFrame);
    info.name = Some(name.unwrap_or(ticker).to_string());
    info.current_price = Some(price);
    info.previous_close = Some(previous);
    info.change_pct = Some(if previous > 0.0 {
        (price - previous) / previous * 100.0
    } else {
        0.0
    });
    Some(info)
}
