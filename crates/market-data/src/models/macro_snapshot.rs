use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeDelta};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::frame::CanonicalFrame;
use super::table::PriceTable;
use crate::resolver::MACRO_PREFIX;

/// Federal Reserve total assets, millions of USD (weekly).
pub const FED_BALANCE_SHEET: &str = "WALCL";
/// Treasury General Account, millions of USD (weekly).
pub const TREASURY_GENERAL_ACCOUNT: &str = "WTREGEN";
/// Overnight reverse repo facility, billions of USD (daily).
pub const OVERNIGHT_REVERSE_REPO: &str = "RRPONTSYD";
/// Core PCE price index level (monthly).
pub const CORE_PCE_INDEX: &str = "PCEPILFE";

/// Series read as their latest value, with the snapshot field each fills.
const LATEST_VALUE_SERIES: &[(&str, MacroField)] = &[
    ("FEDFUNDS", MacroField::FedFundsRate),
    ("DGS10", MacroField::Us10yYield),
    ("DGS2", MacroField::Us2yYield),
    ("T10Y2Y", MacroField::Us2s10sSpread),
    ("T10Y3M", MacroField::Us3m10sSpread),
    ("BAMLH0A0HYM2", MacroField::HighYieldSpread),
    ("CORESTICKM159SFRBATL", MacroField::CpiYoy),
    ("UNRATE", MacroField::Unemployment),
    ("ICSA", MacroField::InitialClaims),
    ("A191RL1Q225SBEA", MacroField::GdpGrowth),
    (FED_BALANCE_SHEET, MacroField::FedBalanceSheet),
    (TREASURY_GENERAL_ACCOUNT, MacroField::TreasuryGeneralAccount),
    (OVERNIGHT_REVERSE_REPO, MacroField::OvernightReverseRepo),
    ("M2SL", MacroField::M2Supply),
    ("MORTGAGE30US", MacroField::Mortgage30y),
    ("SOFR", MacroField::Sofr),
    ("DTWEXBGS", MacroField::DollarIndex),
];

/// Headline fields counted when reporting snapshot coverage.
const HEADLINE_FIELDS: usize = 9;

/// Largest gap between a WALCL date and the TGA/RRP observation paired with it.
const MAX_PAIRING_GAP_DAYS: i64 = 7;

#[derive(Clone, Copy, Debug)]
enum MacroField {
    FedFundsRate,
    Us10yYield,
    Us2yYield,
    Us2s10sSpread,
    Us3m10sSpread,
    HighYieldSpread,
    CpiYoy,
    Unemployment,
    InitialClaims,
    GdpGrowth,
    FedBalanceSheet,
    TreasuryGeneralAccount,
    OvernightReverseRepo,
    M2Supply,
    Mortgage30y,
    Sofr,
    DollarIndex,
}

/// Canonical ticker for a FRED series id.
pub fn macro_ticker(series_id: &str) -> String {
    format!("{}{}", MACRO_PREFIX, series_id)
}

/// Every ticker a snapshot needs, in a stable order.
pub fn snapshot_tickers() -> Vec<String> {
    LATEST_VALUE_SERIES
        .iter()
        .map(|(id, _)| *id)
        .chain(std::iter::once(CORE_PCE_INDEX))
        .map(macro_ticker)
        .collect()
}

/// Latest macro readings, one field per series.
///
/// Rates, spreads and yields are in percent. Balance sheet fields keep
/// FRED's units (`fed_balance_sheet` and `tga_balance` in millions,
/// `on_rrp` in billions); `net_liquidity` is in billions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSnapshot {
    pub fed_funds_rate: Option<f64>,
    pub us10y_yield: Option<f64>,
    pub us2y_yield: Option<f64>,
    pub us2s10s_spread: Option<f64>,
    pub us3m10s_spread: Option<f64>,
    pub hy_spread: Option<f64>,
    /// Sticky-price core CPI, year over year
    pub cpi_yoy: Option<f64>,
    /// Core PCE index change over the last twelve monthly observations
    pub core_pce_yoy: Option<f64>,
    pub unemployment: Option<f64>,
    pub initial_claims: Option<f64>,
    pub gdp_growth: Option<f64>,
    pub fed_balance_sheet: Option<f64>,
    pub tga_balance: Option<f64>,
    pub on_rrp: Option<f64>,
    pub net_liquidity: Option<f64>,
    pub m2_supply: Option<f64>,
    pub mortgage_rate_30y: Option<f64>,
    pub sofr: Option<f64>,
    pub dollar_index: Option<f64>,

    /// Most recent observation date across all series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,

    /// Providers that served at least one series
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl MacroSnapshot {
    /// Build a snapshot from a table keyed by `FRED:<SERIES>` tickers.
    ///
    /// Missing series leave their field empty. Nothing is estimated.
    pub fn from_table(table: &PriceTable) -> Self {
        let mut snapshot = Self::default();
        for (id, field) in LATEST_VALUE_SERIES {
            let value = table.get(&macro_ticker(id)).and_then(latest_value);
            *snapshot.slot(*field) = value;
        }

        snapshot.core_pce_yoy = table
            .get(&macro_ticker(CORE_PCE_INDEX))
            .and_then(|frame| change_over(frame, 12));

        if let (Some(walcl), Some(tga), Some(rrp)) =
            (snapshot.fed_balance_sheet, snapshot.tga_balance, snapshot.on_rrp)
        {
            snapshot.net_liquidity = Some(net_liquidity(walcl, tga, rrp));
        }

        snapshot.as_of = table.iter().filter_map(|(_, f)| f.last()).map(|b| b.date).max();

        let mut sources: Vec<String> = table
            .iter()
            .map(|(_, frame)| frame.source().to_string())
            .collect();
        sources.sort();
        sources.dedup();
        snapshot.sources = sources;
        snapshot
    }

    /// True when no series resolved.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// How many headline fields are populated, out of how many.
    pub fn coverage(&self) -> (usize, usize) {
        let headline = [
            self.fed_funds_rate,
            self.us10y_yield,
            self.us2y_yield,
            self.us2s10s_spread,
            self.hy_spread,
            self.cpi_yoy,
            self.unemployment,
            self.fed_balance_sheet,
            self.net_liquidity,
        ];
        (headline.iter().flatten().count(), HEADLINE_FIELDS)
    }

    fn slot(&mut self, field: MacroField) -> &mut Option<f64> {
        match field {
            MacroField::FedFundsRate => &mut self.fed_funds_rate,
            MacroField::Us10yYield => &mut self.us10y_yield,
            MacroField::Us2yYield => &mut self.us2y_yield,
            MacroField::Us2s10sSpread => &mut self.us2s10s_spread,
            MacroField::Us3m10sSpread => &mut self.us3m10s_spread,
            MacroField::HighYieldSpread => &mut self.hy_spread,
            MacroField::CpiYoy => &mut self.cpi_yoy,
            MacroField::Unemployment => &mut self.unemployment,
            MacroField::InitialClaims => &mut self.initial_claims,
            MacroField::GdpGrowth => &mut self.gdp_growth,
            MacroField::FedBalanceSheet => &mut self.fed_balance_sheet,
            MacroField::TreasuryGeneralAccount => &mut self.tga_balance,
            MacroField::OvernightReverseRepo => &mut self.on_rrp,
            MacroField::M2Supply => &mut self.m2_supply,
            MacroField::Mortgage30y => &mut self.mortgage_rate_30y,
            MacroField::Sofr => &mut self.sofr,
            MacroField::DollarIndex => &mut self.dollar_index,
        }
    }
}

/// One week of the net liquidity series, in billions of USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPoint {
    pub date: NaiveDate,
    pub fed_balance_sheet: f64,
    pub tga_balance: f64,
    pub on_rrp: f64,
    pub net_liquidity: f64,
}

/// Fed balance sheet minus the TGA minus reverse repo, in billions.
///
/// `walcl` and `tga` are FRED millions; `rrp` is already in billions.
pub fn net_liquidity(walcl: f64, tga: f64, rrp: f64) -> f64 {
    walcl / 1000.0 - tga / 1000.0 - rrp
}

/// Net liquidity on each WALCL date.
///
/// TGA and RRP are paired by exact date, else by the nearest observation
/// within a week. Dates with no pairing are skipped.
pub fn liquidity_trend(
    walcl: &CanonicalFrame,
    tga: &CanonicalFrame,
    rrp: &CanonicalFrame,
) -> Vec<LiquidityPoint> {
    let tga = closes_by_date(tga);
    let rrp = closes_by_date(rrp);

    walcl
        .rows()
        .iter()
        .filter_map(|bar| {
            let w = bar.close.to_f64()?;
            let t = nearest(&tga, bar.date)?;
            let r = nearest(&rrp, bar.date)?;
            Some(LiquidityPoint {
                date: bar.date,
                fed_balance_sheet: w / 1000.0,
                tga_balance: t / 1000.0,
                on_rrp: r,
                net_liquidity: net_liquidity(w, t, r),
            })
        })
        .collect()
}

fn latest_value(frame: &CanonicalFrame) -> Option<f64> {
    frame.last().and_then(|bar| bar.close.to_f64())
}

/// Percent change between the latest row and the row `lag` observations
/// earlier. `None` without enough history or with a non-positive base.
fn change_over(frame: &CanonicalFrame, lag: usize) -> Option<f64> {
    let rows = frame.rows();
    let now = rows.last()?.close.to_f64()?;
    let base = rows.len().checked_sub(lag + 1).and_then(|i| rows.get(i))?;
    let base = base.close.to_f64().filter(|b| *b > 0.0)?;
    Some((now - base) / base * 100.0)
}

fn closes_by_date(frame: &CanonicalFrame) -> BTreeMap<NaiveDate, f64> {
    frame
        .rows()
        .iter()
        .filter_map(|bar| Some((bar.date, bar.close.to_f64()?)))
        .collect()
}

fn nearest(values: &BTreeMap<NaiveDate, f64>, date: NaiveDate) -> Option<f64> {
    let gap = TimeDelta::days(MAX_PAIRING_GAP_DAYS);
    let before = values.range(..=date).next_back();
    let after = values.range(date..).next();
    [before, after]
        .into_iter()
        .flatten()
        .map(|(d, v)| ((*d - date).abs(), *v))
        .filter(|(diff, _)| *diff <= gap)
        .min_by_key(|(diff, _)| *diff)
        .map(|(_, v)| v)
}
