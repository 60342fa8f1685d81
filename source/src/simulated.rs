//! Test-mode decorator: perturbs `OK` prices by up to ±10% and synthesizes a
//! strictly monotone per-ticker timestamp, so repeated runs against a live
//! (or otherwise non-ticking) upstream still produce distinguishable samples.

use std::collections::HashMap;
use std::sync::Mutex;

use pricing_core::PriceSample;
use rand::Rng;

use crate::{PriceSource, SourceError};

pub struct SimulatedSource<S> {
    base: S,
    last_synthetic_ts: Mutex<HashMap<String, i64>>,
}

impl<S: PriceSource> SimulatedSource<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            last_synthetic_ts: Mutex::new(HashMap::new()),
        }
    }

    fn synthesize_timestamp(&self, ticker: &str, base_ts: i64) -> i64 {
        let mut last = self.last_synthetic_ts.lock().unwrap();
        let next = match last.get(ticker) {
            None if base_ts > 0 => base_ts,
            None => common::time::now_epoch_secs(),
            Some(&prev) if base_ts > prev => base_ts,
            Some(&prev) => prev + 1,
        };
        last.insert(ticker.to_string(), next);
        next
    }
}

impl<S: PriceSource> PriceSource for SimulatedSource<S> {
    fn fetch(&self, ticker: &str) -> Result<PriceSample, SourceError> {
        let mut sample = self.base.fetch(ticker)?;
        if !sample.is_ok() {
            return Ok(sample);
        }

        let delta = rand::thread_rng().gen_range(-0.10..=0.10);
        sample.price = (sample.price * (1.0 + delta)).max(0.0);
        sample.timestamp = self.synthesize_timestamp(ticker, sample.timestamp);

        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricing_core::SampleStatus;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct ConstantSource {
        price: f64,
        base_ts: AtomicI64,
    }

    impl PriceSource for ConstantSource {
        fn fetch(&self, ticker: &str) -> Result<PriceSample, SourceError> {
            Ok(PriceSample::ok(
                self.base_ts.load(Ordering::SeqCst),
                ticker,
                self.price,
            ))
        }
    }

    struct AlwaysErrorSource;

    impl PriceSource for AlwaysErrorSource {
        fn fetch(&self, ticker: &str) -> Result<PriceSample, SourceError> {
            Ok(PriceSample::error(ticker, "always fails"))
        }
    }

    #[test]
    fn perturbs_price_within_ten_percent() {
        let sim = SimulatedSource::new(ConstantSource {
            price: 100.0,
            base_ts: AtomicI64::new(1_700_000_000),
        });
        for _ in 0..200 {
            let sample = sim.fetch("AAA").unwrap();
            assert!(sample.price >= 90.0 && sample.price <= 110.0, "{}", sample.price);
        }
    }

    #[test]
    fn timestamps_strictly_increase_per_ticker_on_repeated_base_ts() {
        let sim = SimulatedSource::new(ConstantSource {
            price: 100.0,
            base_ts: AtomicI64::new(1_700_000_000),
        });
        let first = sim.fetch("AAA").unwrap().timestamp;
        let second = sim.fetch("AAA").unwrap().timestamp;
        let third = sim.fetch("AAA").unwrap().timestamp;
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn error_samples_pass_through_unchanged() {
        let sim = SimulatedSource::new(AlwaysErrorSource);
        let sample = sim.fetch("ERR").unwrap();
        assert_eq!(sample.status, SampleStatus::Error);
        assert_eq!(sample.price, 0.0);
    }

    #[test]
    fn first_observation_with_no_base_ts_uses_wall_clock() {
        let sim = SimulatedSource::new(ConstantSource {
            price: 50.0,
            base_ts: AtomicI64::new(-1),
        });
        let sample = sim.fetch("ZZZ").unwrap();
        assert!(sample.timestamp > 0);
    }
}
