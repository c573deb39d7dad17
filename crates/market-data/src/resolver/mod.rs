//! Symbol resolution.
//!
//! - `catalog` - static vocabulary tables loaded from `symbols.json`
//! - `translator` - per-provider translation rules and the probe memo

mod catalog;
mod translator;

pub use catalog::{display_name, price_bounds};
pub use translator::{SymbolMapping, SymbolTranslator, MACRO_PREFIX};
