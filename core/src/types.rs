use std::fmt;

/// One polled market observation for a single ticker.
///
/// `status = Ok` implies `error` is empty and `timestamp > 0`; `status = Error`
/// implies `timestamp == -1` is the conventional "no exchange time" marker,
/// though callers never assert that directly.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub timestamp: i64,
    pub ticker: String,
    pub price: f64,
    pub status: SampleStatus,
    pub error: String,
}

impl PriceSample {
    pub fn ok(timestamp: i64, ticker: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            price,
            status: SampleStatus::Ok,
            error: String::new(),
        }
    }

    pub fn error(ticker: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            timestamp: -1,
            ticker: ticker.into(),
            price: 0.0,
            status: SampleStatus::Error,
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, SampleStatus::Ok)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStatus {
    Ok,
    Error,
}

impl SampleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStatus::Ok => "OK",
            SampleStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SampleStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(SampleStatus::Ok),
            _ => Ok(SampleStatus::Error),
        }
    }
}

/// Per-ticker option-pricing configuration, as loaded from the `bsm_params`
/// table joined against `ticker`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsmParams {
    pub strike: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    pub volatility: f64,
    pub maturity_years: f64,
    pub ticker_id: i64,
    pub conf_id: i64,
}

/// One computed option price, derived from a `PriceSample` plus the
/// `BsmParams` in effect for its ticker at join time.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionQuote {
    pub timestamp: i64,
    pub ticker: String,
    pub underlying_price: f64,
    pub option_price: f64,
    pub status: SampleStatus,
    pub error: String,
    pub ticker_id: i64,
    pub conf_id: i64,
}

impl OptionQuote {
    /// Seeds a quote from the originating sample; `option_price`, `ticker_id`,
    /// `conf_id` are filled in by the caller once the join/compute is done.
    pub fn from_sample(sample: &PriceSample) -> Self {
        Self {
            timestamp: sample.timestamp,
            ticker: sample.ticker.clone(),
            underlying_price: sample.price,
            option_price: 0.0,
            status: sample.status,
            error: sample.error.clone(),
            ticker_id: 0,
            conf_id: 0,
        }
    }
}
