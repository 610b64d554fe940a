//! Comma-separated text input, one user per line

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;

use crate::data::InteractionLog;
use crate::error::{LockstepError, LockstepResult};

/// Parse a text interaction log from disk
pub fn load_text_log<P: AsRef<Path>>(path: P) -> LockstepResult<InteractionLog> {
    let path = path.as_ref();
    log::info!("Reading text interaction log: {}", path.display());

    let file = File::open(path)?;
    parse_text_log(BufReader::new(file))
}

/// Parse rows of comma-separated non-negative reals.
///
/// Blank lines are skipped; every remaining row must have the width of
/// the first one.
pub fn parse_text_log<R: BufRead>(reader: R) -> LockstepResult<InteractionLog> {
    let mut width: Option<usize> = None;
    let mut values: Vec<f64> = Vec::new();
    let mut rows = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let before = values.len();
        for (col, cell) in trimmed.split(',').enumerate() {
            let cell = cell.trim();
            let value = cell
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| LockstepError::InvalidTimestamp {
                    line: line_no,
                    column: col + 1,
                    value: cell.to_string(),
                })?;
            values.push(value);
        }

        let found = values.len() - before;
        match width {
            None => width = Some(found),
            Some(expected) if expected != found => {
                return Err(LockstepError::MalformedRow {
                    line: line_no,
                    expected,
                    found,
                });
            }
            _ => {}
        }
        rows += 1;
    }

    let cols = width.ok_or(LockstepError::EmptyLog)?;
    log::info!("Parsed {} users across {} pages", rows, cols);

    let found = values.len();
    let times = Array2::from_shape_vec((rows, cols), values).map_err(|_| {
        LockstepError::DimensionMismatch {
            expected: rows * cols,
            found,
        }
    })?;
    InteractionLog::from_times(times)
}
