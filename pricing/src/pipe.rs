//! Input side of the named-pipe transport: opens the FIFO for reading and
//! feeds each line into the shared input channel, undecoded — decoding
//! happens in the pricing workers so a malformed line only costs one
//! worker iteration, not the whole reader loop.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use tracing::info;

use pricing_core::BlockingChannel;

/// Opens `path` for reading and blocks, line by line, until EOF (the writer
/// closed its end) or the process is asked to stop. Closes `input` on exit
/// either way, unblocking every pricing worker.
pub fn run_reader(path: &str, input: Arc<BlockingChannel<String>>) -> std::io::Result<()> {
    info!(path, "opening pipe for reading");
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        input.write(line.clone());
    }

    info!("pipe reader hit EOF; closing input channel");
    input.close();
    Ok(())
}
