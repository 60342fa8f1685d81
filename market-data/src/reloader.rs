//! Periodic ticker-set reloader: polls the `ticker`/`bsm_params` join every
//! [`crate::config::TICKER_RELOAD_INTERVAL_MS`] and feeds any newly
//! discovered tickers into the running [`MarketDataService`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use db::Db;
use source::PriceSource;

use crate::service::MarketDataService;

pub struct Reloader {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Reloader {
    pub fn spawn<S: PriceSource + 'static>(
        db: Arc<Db>,
        service: Arc<MarketDataService<S>>,
        initial_known: Vec<String>,
        interval: Duration,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("ticker-reloader".into())
            .spawn(move || {
                let mut known: HashSet<String> = initial_known.into_iter().collect();
                while worker_running.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if !worker_running.load(Ordering::SeqCst) {
                        break;
                    }
                    match db::load_tickers(&db) {
                        Ok(fresh) => {
                            let new: Vec<String> = fresh
                                .iter()
                                .filter(|t| !known.contains(*t))
                                .cloned()
                                .collect();
                            if !new.is_empty() {
                                service.add_tickers(&new);
                                known.extend(new);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "ticker reload failed; retaining previous snapshot");
                        }
                    }
                }
            })
            .expect("spawning the ticker reloader thread should never fail");

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Reloader {
    fn drop(&mut self) {
        self.stop();
    }
}
