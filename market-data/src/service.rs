//! Market-Data Service (Stage A): one polling OS thread per ticker, emitting
//! deduplicated [`PriceSample`]s onto a shared output channel.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use pricing_core::{BlockingChannel, PriceSample};
use source::PriceSource;

struct Inner {
    known: HashSet<String>,
    workers: Vec<JoinHandle<()>>,
}

pub struct MarketDataService<S: PriceSource + 'static> {
    source: Arc<S>,
    interval: Duration,
    output: Arc<BlockingChannel<PriceSample>>,
    running: Arc<AtomicBool>,
    inner: Mutex<Inner>,
}

impl<S: PriceSource + 'static> MarketDataService<S> {
    pub fn new(
        initial_tickers: Vec<String>,
        source: S,
        output: Arc<BlockingChannel<PriceSample>>,
        interval: Duration,
    ) -> Self {
        Self {
            source: Arc::new(source),
            interval,
            output,
            running: Arc::new(AtomicBool::new(false)),
            inner: Mutex::new(Inner {
                known: initial_tickers.into_iter().collect(),
                workers: Vec::new(),
            }),
        }
    }

    /// Spawns one worker thread per currently-known ticker. Idempotent.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut inner = self.inner.lock().unwrap();
        let tickers: Vec<String> = inner.known.iter().cloned().collect();
        for ticker in tickers {
            inner.workers.push(self.spawn_worker(ticker));
        }
        info!(count = inner.workers.len(), "market-data service started");
    }

    /// Registers new tickers, spawning a worker for each one not already
    /// known if the service is currently running. Idempotent on tickers
    /// already known.
    pub fn add_tickers(&self, tickers: &[String]) {
        let mut inner = self.inner.lock().unwrap();
        for ticker in tickers {
            if inner.known.contains(ticker) {
                continue;
            }
            inner.known.insert(ticker.clone());
            if self.running.load(Ordering::SeqCst) {
                let handle = self.spawn_worker(ticker.clone());
                inner.workers.push(handle);
                info!(ticker = %ticker, "spawned worker for newly added ticker");
            } else {
                debug!(ticker = %ticker, "ticker registered; worker deferred until start()");
            }
        }
    }

    /// Clears the running flag, joins every worker, then closes the output
    /// channel. Idempotent.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let workers = {
            let mut inner = self.inner.lock().unwrap();
            std::mem::take(&mut inner.workers)
        };
        for worker in workers {
            let _ = worker.join();
        }
        self.output.close();
        info!("market-data service stopped");
    }

    fn spawn_worker(&self, ticker: String) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let output = Arc::clone(&self.output);
        let running = Arc::clone(&self.running);
        let interval = self.interval;

        thread::Builder::new()
            .name(format!("poll-{ticker}"))
            .spawn(move || worker_loop(ticker, source, output, running, interval))
            .expect("spawning a poll worker thread should never fail")
    }
}

fn worker_loop<S: PriceSource>(
    ticker: String,
    source: Arc<S>,
    output: Arc<BlockingChannel<PriceSample>>,
    running: Arc<AtomicBool>,
    interval: Duration,
) {
    let mut last_ts: i64 = -1;

    while running.load(Ordering::SeqCst) {
        let sample = match source.fetch(&ticker) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "fetch failed");
                PriceSample::error(&ticker, e.to_string())
            }
        };

        let emit = match sample.is_ok() {
            true if sample.timestamp > last_ts => {
                last_ts = sample.timestamp;
                true
            }
            true => false,
            false => true,
        };

        if emit {
            output.write(sample);
        }

        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use source::SourceError;
    use std::sync::atomic::AtomicI64;
    use std::time::Instant;

    struct MonotoneMockSource {
        counter: AtomicI64,
    }

    impl PriceSource for MonotoneMockSource {
        fn fetch(&self, ticker: &str) -> Result<PriceSample, SourceError> {
            let ts = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(PriceSample::ok(ts, ticker, 100.0))
        }
    }

    struct AlwaysFailingSource;

    impl PriceSource for AlwaysFailingSource {
        fn fetch(&self, _ticker: &str) -> Result<PriceSample, SourceError> {
            Err(SourceError::MalformedResponse("boom".into()))
        }
    }

    #[test]
    fn per_ticker_fan_out_covers_every_ticker() {
        let output = Arc::new(BlockingChannel::new());
        let service = MarketDataService::new(
            vec!["AAA".into(), "BBB".into(), "CCC".into()],
            MonotoneMockSource {
                counter: AtomicI64::new(1),
            },
            Arc::clone(&output),
            Duration::from_millis(5),
        );
        service.start();

        let mut seen = HashSet::new();
        for _ in 0..30 {
            if let Some(sample) = output.read() {
                assert!(sample.is_ok());
                assert!(sample.price >= 90.0 && sample.price <= 110.0);
                seen.insert(sample.ticker);
            }
        }
        service.stop();

        assert!(seen.contains("AAA"));
        assert!(seen.contains("BBB"));
        assert!(seen.contains("CCC"));
    }

    #[test]
    fn error_source_emits_error_sample_immediately() {
        let output = Arc::new(BlockingChannel::new());
        let service = MarketDataService::new(
            vec!["ERR_TICK".into()],
            AlwaysFailingSource,
            Arc::clone(&output),
            Duration::from_millis(20),
        );
        service.start();

        let sample = output.read().unwrap();
        assert_eq!(sample.ticker, "ERR_TICK");
        assert!(!sample.is_ok());
        assert!(!sample.error.is_empty());

        service.stop();
    }

    #[test]
    fn dynamic_addition_emits_ok_sample_for_new_ticker() {
        let output = Arc::new(BlockingChannel::new());
        let service = Arc::new(MarketDataService::new(
            vec!["AAA".into()],
            MonotoneMockSource {
                counter: AtomicI64::new(1),
            },
            Arc::clone(&output),
            Duration::from_millis(10),
        ));
        service.start();

        thread::sleep(Duration::from_millis(50));
        service.add_tickers(&["BBB".to_string()]);

        let deadline = Instant::now() + Duration::from_millis(500);
        let mut saw_bbb = false;
        while Instant::now() < deadline {
            if let Some(sample) = output.read() {
                if sample.ticker == "BBB" && sample.is_ok() {
                    saw_bbb = true;
                    break;
                }
            }
        }
        service.stop();
        assert!(saw_bbb, "expected at least one OK sample for BBB");
    }

    #[test]
    fn stop_is_idempotent_and_joins_all_workers() {
        let output = Arc::new(BlockingChannel::new());
        let service = MarketDataService::new(
            vec!["AAA".into()],
            MonotoneMockSource {
                counter: AtomicI64::new(1),
            },
            Arc::clone(&output),
            Duration::from_millis(5),
        );
        service.start();
        service.stop();
        service.stop();
        assert!(output.is_closed());
    }
}
