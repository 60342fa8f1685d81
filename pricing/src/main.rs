use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracing::error;

use pricing_service::config::{self, Cli};
use pricing_service::pipe;
use pricing_service::reloader::ParamsReloader;
use pricing_service::service::{self, PricingService};

use db::{Db, PersistSink};
use pricing_core::BlockingChannel;

fn main() -> ExitCode {
    common::logger::init_logger("pricing-service", std::env::var("LOG_JSON").is_ok());

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

    let initial_params = match db::load_params(&db) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to load initial pricing parameters");
            return ExitCode::FAILURE;
        }
    };
    let params: service::ParamsMap = Arc::new(Mutex::new(initial_params));

    let pipe_path = cli.pipe_path();
    let input = Arc::new(BlockingChannel::<String>::new());
    let sink = Arc::new(PersistSink::new(conninfo));

    let num_workers = config::worker_count();
    let pricing_service = PricingService::start(num_workers, Arc::clone(&input), Arc::clone(&params), sink);

    let mut params_reloader = ParamsReloader::spawn(
        Arc::clone(&db),
        Arc::clone(&params),
        Duration::from_millis(config::PARAMS_RELOAD_INTERVAL_MS),
    );

    let input_for_close = Arc::clone(&input);
    let result = pipe::run_reader(&pipe_path, input);
    // run_reader only closes `input` itself on a clean EOF; on an early `Err`
    // (e.g. the FIFO never opened) it returns before reaching that close, so
    // close it here too or the workers below block on it forever.
    input_for_close.close();

    params_reloader.stop();
    pricing_service.stop();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "pricing service exiting on pipe error");
            ExitCode::FAILURE
        }
    }
}

