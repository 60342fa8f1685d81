use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use market_data_service::config::{self, Cli};
use market_data_service::pipe;
use market_data_service::reloader::Reloader;
use market_data_service::service::MarketDataService;

use db::Db;
use pricing_core::{BlockingChannel, PriceSample};
use source::{MoexSource, PriceSource, SimulatedSource};

fn main() -> ExitCode {
    common::logger::init_logger("market-data-service", std::env::var("LOG_JSON").is_ok());

    let cli = Cli::parse();

    let conninfo = match cli.conninfo() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid database configuration");
            return ExitCode::FAILURE;
        }
    };

    let db = match Db::connect(&conninfo) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!(error = %e, "failed to connect to postgres");
            return ExitCode::FAILURE;
        }
    };

    let tickers = match db::load_tickers(&db) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "failed to load initial ticker set");
            return ExitCode::FAILURE;
        }
    };
    if tickers.is_empty() {
        error!("no tickers configured for pricing; nothing to poll");
        return ExitCode::FAILURE;
    }
    info!(count = tickers.len(), "loaded initial ticker set");

    let pipe_path = config::pipe_path();
    if let Err(e) = pipe::ensure_fifo(&pipe_path) {
        error!(error = %e, path = %pipe_path, "failed to create pipe");
        return ExitCode::FAILURE;
    }

    let output = Arc::new(BlockingChannel::<PriceSample>::new());
    let poll_interval = Duration::from_millis(config::POLL_INTERVAL_MS);
    let reload_interval = Duration::from_millis(config::TICKER_RELOAD_INTERVAL_MS);

    if cli.test {
        run(
            tickers,
            SimulatedSource::new(MoexSource::new().expect("building http client")),
            db,
            output,
            poll_interval,
            reload_interval,
            &pipe_path,
        )
    } else {
        run(
            tickers,
            MoexSource::new().expect("building http client"),
            db,
            output,
            poll_interval,
            reload_interval,
            &pipe_path,
        )
    }
}

fn run<S: PriceSource + 'static>(
    tickers: Vec<String>,
    source: S,
    db: Arc<Db>,
    output: Arc<BlockingChannel<PriceSample>>,
    poll_interval: Duration,
    reload_interval: Duration,
    pipe_path: &str,
) -> ExitCode {
    let service = Arc::new(MarketDataService::new(
        tickers.clone(),
        source,
        Arc::clone(&output),
        poll_interval,
    ));
    service.start();

    let mut reloader = Reloader::spawn(db, Arc::clone(&service), tickers, reload_interval);

    let result = pipe::run_writer(pipe_path, output);

    reloader.stop();
    service.stop();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            info!(error = %e, "downstream reader went away; treating as clean shutdown");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "market-data service exiting on pipe error");
            ExitCode::FAILURE
        }
    }
}
