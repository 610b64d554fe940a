//! Interaction log loading

pub mod binary;
pub mod matrix;
pub mod parquet;
pub mod text;

use std::path::Path;

pub use self::matrix::{InteractionLog, PageIdx, UserIdx};
pub use self::parquet::LabeledLog;

use crate::error::LockstepResult;

/// Load an interaction log, choosing the reader from the file extension.
///
/// `.bin` files are binary caches, `.parquet` files are event tables and
/// anything else is parsed as comma-separated text. For text input a
/// `cache` path enables the binary cache.
pub fn load_interaction_log<P: AsRef<Path>>(
    path: P,
    cache: Option<&Path>,
) -> LockstepResult<LabeledLog> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let log = match extension.as_deref() {
        Some("parquet") => return parquet::load_event_table(path),
        Some("bin") => binary::load_binary_log(path)?,
        _ => match cache {
            Some(cache) => binary::load_text_with_cache(path, cache)?,
            None => text::load_text_log(path)?,
        },
    };

    Ok(LabeledLog::indexed(log))
}
