//! Pricing Service (Stage B): a fixed pool of worker threads, all reading
//! off one shared input channel, joining each sample against the current
//! BSM parameters, and handing the result to a single writer thread.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use db::PersistSink;
use pricing_core::{codec, kernel, BlockingChannel, BsmParams, OptionQuote};

pub type ParamsMap = Arc<Mutex<HashMap<String, BsmParams>>>;

pub struct PricingService {
    output: Arc<BlockingChannel<OptionQuote>>,
    workers: Vec<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl PricingService {
    /// Spawns `num_workers` pricing workers plus one writer thread. All
    /// worker threads compete directly on `input`; no separate dispatch
    /// step is needed since `BlockingChannel::read` already serializes the
    /// hand-off. Workers exit once `input` is closed and drained; `output`
    /// is closed by `stop`, once, only after every worker has joined — never
    /// by the workers themselves, or a worker still mid-compute could have
    /// its result silently dropped by a sibling closing the channel first.
    pub fn start(
        num_workers: usize,
        input: Arc<BlockingChannel<String>>,
        params: ParamsMap,
        sink: Arc<PersistSink>,
    ) -> Self {
        let output = Arc::new(BlockingChannel::<OptionQuote>::new());

        let mut workers = Vec::with_capacity(num_workers);
        for i in 0..num_workers {
            let input = Arc::clone(&input);
            let output = Arc::clone(&output);
            let params = Arc::clone(&params);

            let handle = thread::Builder::new()
                .name(format!("pricing-worker-{i}"))
                .spawn(move || worker_loop(input, output, params))
                .expect("spawning a pricing worker thread should never fail");
            workers.push(handle);
        }

        let writer_output = Arc::clone(&output);
        let writer = thread::Builder::new()
            .name("pricing-writer".into())
            .spawn(move || writer_loop(writer_output, sink))
            .expect("spawning the persist writer thread should never fail");

        Self {
            output,
            workers,
            writer: Some(writer),
        }
    }

    /// Joins every worker, then closes `output` and joins the writer.
    /// Callers must close `input` first (directly or by stopping the pipe
    /// reader feeding it) or the worker join blocks forever.
    pub fn stop(mut self) {
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        self.output.close();
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }
    }
}

fn worker_loop(
    input: Arc<BlockingChannel<String>>,
    output: Arc<BlockingChannel<OptionQuote>>,
    params: ParamsMap,
) {
    while let Some(line) = input.read() {
        let sample = match codec::decode(&line) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, line = %line.trim_end(), "dropping malformed line");
                continue;
            }
        };

        let mut quote = OptionQuote::from_sample(&sample);

        if sample.is_ok() {
            let guard = params.lock().unwrap();
            match guard.get(&sample.ticker) {
                Some(p) => {
                    quote.ticker_id = p.ticker_id;
                    quote.conf_id = p.conf_id;
                    quote.option_price = kernel::call(
                        sample.price,
                        p.strike,
                        p.rate,
                        p.dividend_yield,
                        p.volatility,
                        p.maturity_years,
                    );
                }
                None => {
                    debug!(ticker = %sample.ticker, "no pricing parameters configured; dropping sample");
                    continue;
                }
            }
        } else {
            quote.error = if sample.error.is_empty() {
                "Upstream price error".to_string()
            } else {
                sample.error.clone()
            };
        }

        output.write(quote);
    }
}

fn writer_loop(output: Arc<BlockingChannel<OptionQuote>>, sink: Arc<PersistSink>) {
    while let Some(quote) = output.read() {
        if !sink.write(&quote) {
            warn!(ticker = %quote.ticker, "persist sink dropped a quote");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricing_core::{BsmParams, PriceSample};

    fn params_with(ticker: &str, p: BsmParams) -> ParamsMap {
        let mut map = HashMap::new();
        map.insert(ticker.to_string(), p);
        Arc::new(Mutex::new(map))
    }

    fn sample_params() -> BsmParams {
        BsmParams {
            strike: 100.0,
            rate: 0.05,
            dividend_yield: 0.0,
            volatility: 0.2,
            maturity_years: 1.0,
            ticker_id: 1,
            conf_id: 1,
        }
    }

    #[test]
    fn priced_quote_uses_kernel_and_matching_params() {
        let input = Arc::new(BlockingChannel::<String>::new());
        let output = Arc::new(BlockingChannel::<OptionQuote>::new());
        let params = params_with("AAA", sample_params());

        input.write(codec::encode(&PriceSample::ok(1_700_000_000, "AAA", 100.0)));
        input.close();

        worker_loop(input, Arc::clone(&output), params);

        let quote = output.read().unwrap();
        assert_eq!(quote.ticker, "AAA");
        assert!(quote.option_price > 0.0);
        assert_eq!(quote.ticker_id, 1);
    }

    #[test]
    fn sample_without_configured_params_is_dropped() {
        let input = Arc::new(BlockingChannel::<String>::new());
        let output = Arc::new(BlockingChannel::<OptionQuote>::new());
        let params: ParamsMap = Arc::new(Mutex::new(HashMap::new()));

        input.write(codec::encode(&PriceSample::ok(1, "UNKNOWN", 50.0)));
        input.close();

        worker_loop(input, Arc::clone(&output), params);

        assert_eq!(output.read(), None);
    }

    #[test]
    fn error_sample_passes_through_without_params_lookup() {
        let input = Arc::new(BlockingChannel::<String>::new());
        let output = Arc::new(BlockingChannel::<OptionQuote>::new());
        let params: ParamsMap = Arc::new(Mutex::new(HashMap::new()));

        input.write(codec::encode(&PriceSample::error("AAA", "upstream down")));
        input.close();

        worker_loop(input, Arc::clone(&output), params);

        let quote = output.read().unwrap();
        assert_eq!(quote.ticker, "AAA");
        assert_eq!(quote.option_price, 0.0);
        assert_eq!(quote.error, "upstream down");
    }

    #[test]
    fn error_sample_with_empty_error_gets_fallback_message() {
        let input = Arc::new(BlockingChannel::<String>::new());
        let output = Arc::new(BlockingChannel::<OptionQuote>::new());
        let params: ParamsMap = Arc::new(Mutex::new(HashMap::new()));

        input.write("{\"ticker\":\"AAA\"}\n".to_string());
        input.close();

        worker_loop(input, Arc::clone(&output), params);

        let quote = output.read().unwrap();
        assert_eq!(quote.ticker, "AAA");
        assert_eq!(quote.error, "Upstream price error");
    }

    #[test]
    fn malformed_line_is_dropped_not_fatal() {
        let input = Arc::new(BlockingChannel::<String>::new());
        let output = Arc::new(BlockingChannel::<OptionQuote>::new());
        let params: ParamsMap = Arc::new(Mutex::new(HashMap::new()));

        input.write("{\"not\":\"a valid sample\"}\n".to_string());
        input.write(codec::encode(&PriceSample::error("AAA", "ok after garbage")));
        input.close();

        worker_loop(input, Arc::clone(&output), params);

        let quote = output.read().unwrap();
        assert_eq!(quote.ticker, "AAA");
        assert_eq!(output.read(), None);
    }
}
