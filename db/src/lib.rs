pub mod error;
pub mod params;
pub mod persist;
pub mod pool;
pub mod tickers;

pub use error::DbError;
pub use params::load_params;
pub use persist::PersistSink;
pub use pool::{Db, SharedDb};
pub use tickers::load_tickers;
