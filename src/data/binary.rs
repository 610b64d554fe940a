//! Binary serialization of the timestamp matrix

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array2;

use crate::data::{text, InteractionLog};
use crate::error::LockstepResult;

/// Load a matrix previously written by [`save_binary_log`]
pub fn load_binary_log<P: AsRef<Path>>(path: P) -> LockstepResult<InteractionLog> {
    let path = path.as_ref();
    log::info!("Reading binary interaction log: {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let times: Array2<f64> = bincode::deserialize_from(reader)?;

    log::info!("Loaded {} users across {} pages", times.nrows(), times.ncols());
    InteractionLog::from_times(times)
}

/// Write the timestamp matrix of `log` in the binary cache format
pub fn save_binary_log<P: AsRef<Path>>(log: &InteractionLog, path: P) -> LockstepResult<()> {
    let path = path.as_ref();
    log::info!("Caching interaction log to {}", path.display());

    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, log.times())?;
    writer.flush()?;
    Ok(())
}

/// Parse a text log, reusing (or creating) a binary cache next to it
pub fn load_text_with_cache<P: AsRef<Path>, C: AsRef<Path>>(
    path: P,
    cache: C,
) -> LockstepResult<InteractionLog> {
    let cache = cache.as_ref();
    if cache.exists() {
        log::debug!("Binary cache hit: {}", cache.display());
        return load_binary_log(cache);
    }

    let log = text::load_text_log(path)?;
    save_binary_log(&log, cache)?;
    Ok(log)
}
