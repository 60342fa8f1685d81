//! Output side of the named-pipe transport: creates the FIFO if it doesn't
//! exist, then drains the service's output channel into it, one
//! [`pricing_core::codec`]-encoded line per sample.

use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::sync::Arc;

use tracing::{error, info};

use pricing_core::{codec, BlockingChannel, PriceSample};

/// Creates `path` as a FIFO with mode `0666` if it doesn't already exist.
/// `std` has no portable FIFO constructor, so this goes straight to libc,
/// matching the original `mkfifo` call.
pub fn ensure_fifo(path: &str) -> std::io::Result<()> {
    let c_path = CString::new(path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o666) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    if err.kind() == std::io::ErrorKind::AlreadyExists {
        return Ok(());
    }
    Err(err)
}

/// Opens `path` for writing and drains `output` into it until the channel
/// closes. Opening a FIFO for writing blocks until a reader attaches, which
/// is exactly the hand-off the pipeline relies on.
pub fn run_writer(path: &str, output: Arc<BlockingChannel<PriceSample>>) -> std::io::Result<()> {
    info!(path, "opening pipe for writing; blocks until a reader attaches");
    let mut file = OpenOptions::new().write(true).custom_flags(0).open(path)?;

    while let Some(sample) = output.read() {
        let line = codec::encode(&sample);
        if let Err(e) = file.write_all(line.as_bytes()) {
            error!(error = %e, "pipe write failed; stopping writer");
            return Err(e);
        }
    }
    info!("output channel closed; pipe writer exiting");
    Ok(())
}
