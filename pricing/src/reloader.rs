//! Periodic BSM parameter reloader: refreshes the shared [`ParamsMap`] every
//! [`crate::config::PARAMS_RELOAD_INTERVAL_MS`] so newly configured tickers
//! (and edited strike/rate/vol/maturity values) take effect without a
//! restart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use db::Db;

use crate::service::ParamsMap;

pub struct ParamsReloader {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ParamsReloader {
    pub fn spawn(db: Arc<Db>, params: ParamsMap, interval: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("params-reloader".into())
            .spawn(move || {
                while worker_running.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if !worker_running.load(Ordering::SeqCst) {
                        break;
                    }
                    match db::load_params(&db) {
                        Ok(fresh) => {
                            let mut guard = params.lock().unwrap();
                            *guard = fresh;
                        }
                        Err(e) => {
                            warn!(error = %e, "params reload failed; retaining previous snapshot");
                        }
                    }
                }
            })
            .expect("spawning the params reloader thread should never fail");

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

impl Drop for ParamsReloader {
    fn drop(&mut self) {
        self.stop();
    }
}
