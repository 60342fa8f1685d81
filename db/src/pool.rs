//! Bridges the pipeline's OS-thread concurrency model to `sqlx`'s
//! async-only Postgres driver.
//!
//! `Db` owns a small dedicated multi-thread Tokio runtime used purely as an
//! I/O executor — nothing in the pipeline's control flow (worker loops,
//! channel reads, thread joins) runs on it. Loader and sink threads call the
//! blocking methods here exactly as they'd call any other blocking I/O
//! function.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::runtime::{Builder, Runtime};

use crate::error::DbError;

pub struct Db {
    runtime: Runtime,
    pool: PgPool,
}

impl Db {
    /// Connects to Postgres using `conninfo`, blocking the calling thread
    /// until the pool is established.
    pub fn connect(conninfo: &str) -> Result<Self, DbError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(DbError::Runtime)?;

        let pool = runtime.block_on(async {
            PgPoolOptions::new()
                .max_connections(8)
                .connect(conninfo)
                .await
        }).map_err(DbError::Connect)?;

        Ok(Self { runtime, pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs an async closure against the pool to completion on the internal
    /// runtime, from a synchronous caller.
    pub fn block_on<F, T>(&self, fut: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.runtime.block_on(fut)
    }
}

/// Shared handle, cloned into every loader/sink that a process constructs.
pub type SharedDb = Arc<Db>;
