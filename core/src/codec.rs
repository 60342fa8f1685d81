//! Canonical single-line wire format for a [`PriceSample`], shared by the
//! byte pipe that connects the market-data service to the pricing service.
//!
//! Encoding is a flat, hand-built JSON object with keys in a fixed order;
//! decoding is a tolerant substring scan, not a JSON parser. Neither side
//! escapes quotes inside string fields — see spec Open Questions. This is a
//! known, deliberate limitation, not a bug to "fix" here.

use thiserror::Error;

use crate::types::{PriceSample, SampleStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("line is missing a ticker field")]
    MissingTicker,
}

/// Encodes `sample` as a single line, terminated by `\n`.
///
/// Key order is fixed: `timestamp, ticker, price, status, error`.
pub fn encode(sample: &PriceSample) -> String {
    format!(
        "{{\"timestamp\":{},\"ticker\":\"{}\",\"price\":{},\"status\":\"{}\",\"error\":\"{}\"}}\n",
        sample.timestamp,
        sample.ticker,
        sample.price,
        sample.status.as_str(),
        sample.error,
    )
}

/// Decodes a single line back into a [`PriceSample`].
///
/// Missing `ticker` is the only hard rejection. Missing numeric fields
/// default to `0`; a missing or unrecognized `status` becomes `ERROR`.
pub fn decode(line: &str) -> Result<PriceSample, DecodeError> {
    let ticker = extract_string(line, "ticker").ok_or(DecodeError::MissingTicker)?;
    let timestamp = extract_number(line, "timestamp").unwrap_or(0.0) as i64;
    let price = extract_number(line, "price").unwrap_or(0.0);
    let status = extract_string(line, "status")
        .and_then(|s| s.parse::<SampleStatus>().ok())
        .unwrap_or(SampleStatus::Error);
    let error = extract_string(line, "error").unwrap_or_default();

    Ok(PriceSample {
        timestamp,
        ticker,
        price,
        status,
        error,
    })
}

/// Locates `"key":"..."` and returns the quoted value, or `None` if the key
/// isn't present.
fn extract_string(line: &str, key: &str) -> Option<String> {
    let needle = format!("\"{key}\":\"");
    let start = line.find(&needle)? + needle.len();
    let rest = &line[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Locates `"key":<number>` and returns the numeric value up to the next
/// delimiter (`,` or `}`), or `None` if the key isn't present or unparsable.
fn extract_number(line: &str, key: &str) -> Option<f64> {
    let needle = format!("\"{key}\":");
    let start = line.find(&needle)? + needle.len();
    let rest = &line[start..];
    let end = rest.find([',', '}']).unwrap_or(rest.len());
    rest[..end].trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ok_sample() {
        let sample = PriceSample::ok(1_700_000_000, "AAA", 123.45);
        let decoded = decode(&encode(&sample)).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn round_trips_error_sample() {
        let sample = PriceSample::error("ERR_TICK", "upstream timeout");
        let decoded = decode(&encode(&sample)).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn missing_ticker_is_rejected() {
        let line = "{\"timestamp\":1,\"price\":1.0,\"status\":\"OK\",\"error\":\"\"}\n";
        assert_eq!(decode(line), Err(DecodeError::MissingTicker));
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let line = "{\"ticker\":\"AAA\",\"status\":\"OK\"}\n";
        let decoded = decode(line).unwrap();
        assert_eq!(decoded.timestamp, 0);
        assert_eq!(decoded.price, 0.0);
    }

    #[test]
    fn missing_status_becomes_error() {
        let line = "{\"ticker\":\"AAA\"}\n";
        let decoded = decode(line).unwrap();
        assert_eq!(decoded.status, SampleStatus::Error);
    }

    #[test]
    fn key_order_matches_canonical_layout() {
        let sample = PriceSample::ok(1, "AAA", 1.0);
        let line = encode(&sample);
        let order = ["timestamp", "ticker", "price", "status", "error"];
        let mut last = 0;
        for key in order {
            let pos = line.find(&format!("\"{key}\"")).unwrap();
            assert!(pos >= last, "key {key} out of order");
            last = pos;
        }
    }
}
