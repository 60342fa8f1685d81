//! Parameter Loader: the per-ticker Black–Scholes configuration used to
//! join against incoming price samples.

use std::collections::HashMap;

use sqlx::Row;
use tracing::warn;

use pricing_core::BsmParams;

use crate::error::DbError;
use crate::pool::Db;

/// Joins `ticker` and `bsm_params` into `ticker name -> BsmParams`.
///
/// On failure, logs a warning and returns the error; callers retain the
/// previous `ParamsMap` and retry on the next reload tick.
pub fn load_params(db: &Db) -> Result<HashMap<String, BsmParams>, DbError> {
    let rows = db.block_on(async {
        sqlx::query(
            r#"
            SELECT
                t.name AS name,
                p.strike AS strike,
                p.rate AS rate,
                p.dividend_yield AS dividend_yield,
                p.volatility AS volatility,
                p.maturity_years AS maturity_years,
                t.id AS ticker_id,
                p.id AS conf_id
            FROM ticker t
            JOIN bsm_params p ON p.ticker_id = t.id
            "#,
        )
        .fetch_all(db.pool())
        .await
    });

    match rows {
        Ok(rows) => Ok(rows
            .into_iter()
            .map(|row| {
                let name: String = row.get("name");
                let params = BsmParams {
                    strike: row.get("strike"),
                    rate: row.get("rate"),
                    dividend_yield: row.get("dividend_yield"),
                    volatility: row.get("volatility"),
                    maturity_years: row.get("maturity_years"),
                    ticker_id: row.get("ticker_id"),
                    conf_id: row.get("conf_id"),
                };
                (name, params)
            })
            .collect()),
        Err(e) => {
            warn!(error = %e, "parameter loader query failed; retaining previous snapshot");
            Err(DbError::Query(e))
        }
    }
}
