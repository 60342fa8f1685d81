//! HTTP-backed [`PriceSource`] against the MOEX ISS quote API.
//!
//! The upstream JSON shape is treated as an external collaborator's
//! contract, not something this pipeline owns — this module only needs to
//! extract a last price and an exchange timestamp from it, tolerating
//! reordering of the `marketdata.columns` array the way the original
//! implementation did.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use pricing_core::PriceSample;

use crate::{PriceSource, SourceError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct MoexSource {
    http: Client,
}

impl MoexSource {
    pub fn new() -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SourceError::Http)?;
        Ok(Self { http })
    }

    fn build_url(ticker: &str) -> String {
        format!(
            "https://iss.moex.com/iss/engines/stock/markets/shares/boards/tqbr/securities/{}.json?iss.meta=off",
            ticker.to_lowercase()
        )
    }
}

impl Default for MoexSource {
    fn default() -> Self {
        Self::new().expect("building the default reqwest client should never fail")
    }
}

impl PriceSource for MoexSource {
    #[instrument(skip(self), fields(ticker = %ticker), level = "debug")]
    fn fetch(&self, ticker: &str) -> Result<PriceSample, SourceError> {
        let url = Self::build_url(ticker);
        let body: Value = self.http.get(&url).send()?.error_for_status()?.json()?;

        let price = extract_column(&body, "LAST")
            .ok_or_else(|| SourceError::MalformedResponse("LAST column missing".into()))?;
        let timestamp = extract_timestamp(&body)?;

        debug!(price, timestamp, "moex quote fetched");
        Ok(PriceSample::ok(timestamp, ticker, price))
    }
}

/// Locates `marketdata.columns` and `marketdata.data[0]`, returning the
/// value in the column named `name` from the first data row.
fn extract_column(body: &Value, name: &str) -> Option<f64> {
    let marketdata = body.get("marketdata")?;
    let columns = marketdata.get("columns")?.as_array()?;
    let row = marketdata.get("data")?.as_array()?.first()?.as_array()?;

    let index = columns.iter().position(|c| c.as_str() == Some(name))?;
    row.get(index)?.as_f64()
}

fn extract_timestamp(body: &Value) -> Result<i64, SourceError> {
    let marketdata = body
        .get("marketdata")
        .ok_or_else(|| SourceError::MalformedResponse("marketdata section not found".into()))?;
    let columns = marketdata
        .get("columns")
        .and_then(|c| c.as_array())
        .ok_or_else(|| SourceError::MalformedResponse("columns not found".into()))?;
    let row = marketdata
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|rows| rows.first())
        .and_then(|r| r.as_array())
        .ok_or_else(|| SourceError::MalformedResponse("data row not found".into()))?;

    let index = columns
        .iter()
        .position(|c| c.as_str() == Some("SYSTIME"))
        .ok_or_else(|| SourceError::MalformedResponse("SYSTIME column not found".into()))?;

    let raw = row
        .get(index)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SourceError::MalformedResponse("SYSTIME value not a string".into()))?;

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|e| SourceError::MalformedResponse(format!("bad SYSTIME {raw:?}: {e}")))
}
