//! Ticker Loader: the set of tickers for which pricing is actually
//! configured.

use sqlx::Row;
use tracing::warn;

use crate::error::DbError;
use crate::pool::Db;

/// Names of rows in `ticker` that also have a corresponding `bsm_params`
/// row, i.e. only tickers pricing is configured for.
///
/// On failure, logs a warning and returns the error; callers are expected
/// to retain the previous snapshot and retry on the next reload tick.
pub fn load_tickers(db: &Db) -> Result<Vec<String>, DbError> {
    let rows = db.block_on(async {
        sqlx::query(
            r#"
            SELECT DISTINCT t.name
            FROM ticker t
            JOIN bsm_params p ON p.ticker_id = t.id
            ORDER BY t.name
            "#,
        )
        .fetch_all(db.pool())
        .await
    });

    match rows {
        Ok(rows) => Ok(rows.into_iter().map(|r| r.get::<String, _>("name")).collect()),
        Err(e) => {
            warn!(error = %e, "ticker loader query failed; retaining previous snapshot");
            Err(DbError::Query(e))
        }
    }
}

#[cfg(test)]
mod tests {
    // Exercising `load_tickers` against a live Postgres instance belongs in
    // the crate's `tests/` integration suite, gated behind a database URL
    // the test harness provides; no unit test here touches the network.
}
