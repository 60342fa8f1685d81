use clap::Parser;

/// CLI surface for the market-data service (Stage A).
///
/// Mirrors the original `CliConfig`: a raw `--pg-conninfo` takes precedence,
/// otherwise a connection string is composed from the discrete `--pg-*`
/// flags.
#[derive(Debug, Parser)]
#[command(name = "market-data-service", version)]
pub struct Cli {
    /// Enable the simulated source decorator instead of the live MOEX feed.
    #[arg(long)]
    pub test: bool,

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
}

impl Cli {
    /// Resolves the final libpq connection string, composing it from the
    /// discrete flags when `--pg-conninfo` wasn't given directly.
    ///
    /// Returns an error when neither form carries enough information —
    /// callers exit with status `1` in that case, per spec §6.
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
}

/// Path to the named pipe shared with the pricing service.
pub fn pipe_path() -> String {
    std::env::var("PRICING_PIPE_PATH").unwrap_or_else(|_| "/tmp/pricing_pipe".to_string())
}

/// Per-ticker poll cadence; fixed per spec §6.
pub const POLL_INTERVAL_MS: u64 = 500;

/// Ticker-set reload cadence; fixed per spec §6.
pub const TICKER_RELOAD_INTERVAL_MS: u64 = 5_000;
