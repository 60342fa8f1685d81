use clap::Parser;

/// CLI surface for the pricing service (Stage B).
///
/// Shares the `--pg-*` connection flags with the market-data service; adds
/// `--pipe-path` since this side reads the named pipe rather than creating it.
#[derive(Debug, Parser)]
#[command(name = "pricing-service", version)]
pub struct Cli {
    #[arg(long)]
    pub pg_conninfo: Option<String>,
    #[arg(long)]
    pub pg_host: Option<String>,
    #[arg(long)]
    pub pg_port: Option<String>,
    #[arg(long)]
    pub pg_user: Option<String>,
    #[arg(long)]
    pub pg_password: Option<String>,
    #[arg(long = "pg-db", alias = "pg-database")]
    pub pg_db: Option<String>,

    /// Overrides `PRICING_PIPE_PATH` / the `/tmp/pricing_pipe` default.
    #[arg(long)]
    pub pipe_path: Option<String>,
}

impl Cli {
    /// Same precedence rules as the market-data service's `Cli::conninfo`.
    pub fn conninfo(&self) -> anyhow::Result<String> {
        if let Some(raw) = &self.pg_conninfo {
            if !raw.is_empty() {
                return Ok(raw.clone());
            }
        }

        let (host, user, db) = match (&self.pg_host, &self.pg_user, &self.pg_db) {
            (Some(h), Some(u), Some(d)) if !h.is_empty() && !u.is_empty() && !d.is_empty() => {
                (h, u, d)
            }
            _ => anyhow::bail!(
                "missing database connection parameters: provide either --pg-conninfo \
                 or all of --pg-host, --pg-user, --pg-db"
            ),
        };

        let mut conninfo = format!("host={host} user={user} dbname={db}");
        if let Some(port) = &self.pg_port {
            if !port.is_empty() {
                conninfo.push_str(&format!(" port={port}"));
            }
        }
        if let Some(password) = &self.pg_password {
            if !password.is_empty() {
                conninfo.push_str(&format!(" password={password}"));
            }
        }
        Ok(conninfo)
    }

    pub fn pipe_path(&self) -> String {
        self.pipe_path
            .clone()
            .or_else(|| std::env::var("PRICING_PIPE_PATH").ok())
            .unwrap_or_else(|| "/tmp/pricing_pipe".to_string())
    }
}

/// Params-map reload cadence; fixed per spec §6.
pub const PARAMS_RELOAD_INTERVAL_MS: u64 = 5_000;

/// Falls back to `4` the way `std::thread::hardware_concurrency() == 0` does
/// in the original.
pub fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
