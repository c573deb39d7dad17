//! FRED series observations.
//!
//! Missing observations are reported as the literal `"."` and are dropped.

use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::Bar;

use super::{malformed, parse_date, parse_decimal};

const PROVIDER_ID: &str = "FRED";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

pub(super) fn observation_rows(body: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| malformed(PROVIDER_ID, e))?;

    Ok(response
        .observations
        .iter()
        .filter(|obs| obs.value.trim() != ".")
        .filter_map(|obs| Some(Bar::flat(parse_date(&obs.date)?, parse_decimal(&obs.value)?)))
        .collect())
}
