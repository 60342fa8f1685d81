//! Upstream price sources: the trait both pipeline stages build worker
//! threads against, a MOEX-backed HTTP implementation, and a simulated
//! decorator for test runs.

pub mod error;
pub mod moex;
pub mod simulated;

pub use error::SourceError;
pub use moex::MoexSource;
pub use simulated::SimulatedSource;

use pricing_core::PriceSample;

/// A blocking fetch of one ticker's current price.
///
/// Implementations must populate a strictly positive `timestamp` on success.
/// Callers (the market-data service's per-ticker workers) are responsible
/// for converting an `Err` into an `ERROR` sample; this trait does not do
/// that normalization itself so that decorators (e.g. [`SimulatedSource`])
/// can still see the distinction between a transport failure and an `OK`
/// sample worth perturbing.
pub trait PriceSource: Send + Sync {
    fn fetch(&self, ticker: &str) -> Result<PriceSample, SourceError>;
}
