//! Persist Sink: inserts one `ticker_price` row per `OK` `OptionQuote`.
//!
//! Connects lazily on first use and reconnects lazily after a failed
//! insert, the way the original `PostgresWriter::ensure_connected` did —
//! a dropped connection degrades the next `write` into a reconnect attempt
//! rather than tearing down the pipeline.

use std::sync::Mutex;

use tracing::{error, warn};

use pricing_core::{OptionQuote, SampleStatus};

use crate::pool::Db;

pub struct PersistSink {
    conninfo: String,
    db: Mutex<Option<Db>>,
}

impl PersistSink {
    pub fn new(conninfo: impl Into<String>) -> Self {
        Self {
            conninfo: conninfo.into(),
            db: Mutex::new(None),
        }
    }

    /// Inserts `quote` if it is `OK`; no-ops (returning `true`) for `ERROR`
    /// quotes. Returns `false` on connection or insert failure; the caller
    /// treats that as a lost-but-not-fatal write.
    pub fn write(&self, quote: &OptionQuote) -> bool {
        if quote.status != SampleStatus::Ok {
            return true;
        }

        let mut guard = self.db.lock().unwrap();
        if guard.is_none() {
            match Db::connect(&self.conninfo) {
                Ok(db) => *guard = Some(db),
                Err(e) => {
                    error!(error = %e, "persist sink: connection failed");
                    return false;
                }
            }
        }

        let db = guard.as_ref().expect("just connected above");
        let result = db.block_on(async {
            sqlx::query(
                r#"
                INSERT INTO ticker_price (ts_exchange, ticker_id, conf_id, option_price, calculated_price)
                VALUES (to_timestamp($1), $2, $3, $4, $4)
                "#,
            )
            .bind(quote.timestamp as f64)
            .bind(quote.ticker_id)
            .bind(quote.conf_id)
            .bind(quote.option_price)
            .execute(db.pool())
            .await
        });

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, ticker = %quote.ticker, "persist sink: insert failed, will reconnect next write");
                *guard = None;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_quote_is_a_no_op_success() {
        let sink = PersistSink::new("");
        let mut quote = OptionQuote::from_sample(&pricing_core::PriceSample::error("ERR", "boom"));
        quote.status = SampleStatus::Error;
        assert!(sink.write(&quote));
    }
}
