use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as whole epoch seconds.
///
/// Used only where no authoritative exchange-side timestamp is available,
/// e.g. the first observation of a ticker under the simulated source.
pub fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as i64
}
