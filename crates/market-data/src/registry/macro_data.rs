//! Macro series readings built on the price path.
//!
//! Every FRED series is requested as a `FRED:<SERIES>` ticker through
//! [`MarketDataManager::get_prices`], so macro reads share the tier walk,
//! the breaker and the session cache with everything else.

use log::{debug, info};
use num_traits::ToPrimitive;

use super::manager::MarketDataManager;
use crate::models::{
    liquidity_trend, macro_ticker, snapshot_tickers, LiquidityPoint, MacroSnapshot,
    FED_BALANCE_SHEET, OVERNIGHT_REVERSE_REPO, TREASURY_GENERAL_ACCOUNT,
};

/// Window for snapshot reads. Long enough for a twelve-month change on
/// monthly series.
pub const MACRO_PERIOD: &str = "1y";

impl MarketDataManager {
    /// Latest observation of one FRED series, e.g. `"DGS10"`.
    pub async fn fred_latest(&mut self, series_id: &str) -> Option<f64> {
        let ticker = macro_ticker(series_id.trim());
        let table = self.get_prices(&[ticker.as_str()], MACRO_PERIOD, "1d").await;
        table
            .get(&ticker)
            .and_then(|frame| frame.last())
            .and_then(|bar| bar.close.to_f64())
    }

    /// Current macro readings in one batch.
    ///
    /// A repeat call in the same session is answered from the cache. Series
    /// that no tier could serve leave their field empty.
    pub async fn macro_snapshot(&mut self) -> MacroSnapshot {
        let tickers = snapshot_tickers();
        let table = self.get_prices(&tickers, MACRO_PERIOD, "1d").await;
        let snapshot = MacroSnapshot::from_table(&table);

        let (found, headline) = snapshot.coverage();
        if snapshot.is_empty() {
            info!("Macro snapshot unavailable: no series resolved");
        } else {
            info!(
                "Macro snapshot: {}/{} headline fields, {} of {} series",
                found,
                headline,
                table.len(),
                tickers.len()
            );
        }
        snapshot
    }

    /// Weekly net liquidity over the last `weeks` WALCL observations, oldest
    /// first. Empty when the balance sheet series is unavailable.
    pub async fn net_liquidity_trend(&mut self, weeks: u32) -> Vec<LiquidityPoint> {
        if weeks == 0 {
            return Vec::new();
        }
        let period = format!("{}d", u64::from(weeks) * 7);
        let tickers = [
            macro_ticker(FED_BALANCE_SHEET),
            macro_ticker(TREASURY_GENERAL_ACCOUNT),
            macro_ticker(OVERNIGHT_REVERSE_REPO),
        ];
        let table = self.get_prices(&tickers, &period, "1d").await;

        let [walcl, tga, rrp] = &tickers;
        let (Some(walcl), Some(tga), Some(rrp)) = (table.get(walcl), table.get(tga), table.get(rrp))
        else {
            debug!("Net liquidity trend unavailable over {} weeks", weeks);
            return Vec::new();
        };

        let weeks = usize::try_from(weeks).unwrap_or(usize::MAX);
        liquidity_trend(&walcl.clone().tail(weeks), tga, rrp)
    }
}
