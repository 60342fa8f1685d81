//! Domain types, numeric kernel, wire codec, and the blocking hand-off
//! channel shared by both pipeline stages.

pub mod channel;
pub mod codec;
pub mod kernel;
pub mod types;

pub use channel::BlockingChannel;
pub use types::{BsmParams, OptionQuote, PriceSample, SampleStatus};
