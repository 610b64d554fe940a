//! Parquet event table handling

use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
use polars::prelude::*;

use crate::data::InteractionLog;
use crate::error::{LockstepError, LockstepResult};

pub const USER_COLUMN: &str = "user";
pub const PAGE_COLUMN: &str = "page";
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Interaction log built from an event table, with the original ids kept
/// so reports can name users and pages instead of matrix indices
#[derive(Debug, Clone)]
pub struct LabeledLog {
    pub log: InteractionLog,
    pub user_ids: Vec<String>,
    pub page_ids: Vec<String>,
}

impl LabeledLog {
    /// Label a bare matrix with its own row and column indices
    pub fn indexed(log: InteractionLog) -> Self {
        let user_ids = (0..log.user_count()).map(|i| i.to_string()).collect();
        let page_ids = (0..log.page_count()).map(|j| j.to_string()).collect();
        Self {
            log,
            user_ids,
            page_ids,
        }
    }
}

/// Assigns dense indices to string ids in first-seen order
#[derive(Default)]
struct IdIndex {
    id_to_index: HashMap<String, usize>,
    ids: Vec<String>,
}

impl IdIndex {
    fn get_or_insert(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.id_to_index.insert(id.to_string(), idx);
        self.ids.push(id.to_string());
        idx
    }
}

/// Load a long-format (user, page, timestamp) table into a dense matrix.
///
/// Repeated (user, page) events keep the earliest timestamp.
pub fn load_event_table<P: AsRef<Path>>(path: P) -> LockstepResult<LabeledLog> {
    let path = path.as_ref();
    log::info!("Reading parquet file: {}", path.display());

    if !path.exists() {
        return Err(LockstepError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?
        .select([
            col(USER_COLUMN).cast(DataType::String),
            col(PAGE_COLUMN).cast(DataType::String),
            col(TIMESTAMP_COLUMN).cast(DataType::Float64),
        ])
        .collect()
        .map_err(|e| match e {
            PolarsError::ColumnNotFound(name) => LockstepError::MissingColumn(name.to_string()),
            other => LockstepError::Polars(other),
        })?;

    log::info!("Loaded {} interaction events", df.height());
    events_to_log(&df)
}

fn events_to_log(df: &DataFrame) -> LockstepResult<LabeledLog> {
    let users = df.column(USER_COLUMN)?.str()?;
    let pages = df.column(PAGE_COLUMN)?.str()?;
    let stamps = df.column(TIMESTAMP_COLUMN)?.f64()?;

    let mut user_index = IdIndex::default();
    let mut page_index = IdIndex::default();
    let mut events: Vec<(usize, usize, f64)> = Vec::with_capacity(df.height());

    for row in 0..df.height() {
        let (Some(user), Some(page), Some(stamp)) =
            (users.get(row), pages.get(row), stamps.get(row))
        else {
            log::debug!("Skipping incomplete event at row {}", row);
            continue;
        };

        if !stamp.is_finite() || stamp <= 0.0 {
            return Err(LockstepError::InvalidTimestamp {
                line: row + 1,
                column: 3,
                value: stamp.to_string(),
            });
        }

        let u = user_index.get_or_insert(user);
        let p = page_index.get_or_insert(page);
        events.push((u, p, stamp));
    }

    if events.is_empty() {
        return Err(LockstepError::EmptyLog);
    }

    log::info!(
        "Building {} x {} interaction matrix",
        user_index.ids.len(),
        page_index.ids.len()
    );

    let mut times = Array2::<f64>::zeros((user_index.ids.len(), page_index.ids.len()));
    for (u, p, stamp) in events {
        let cell = &mut times[[u, p]];
        if *cell == 0.0 || stamp < *cell {
            *cell = stamp;
        }
    }

    Ok(LabeledLog {
        log: InteractionLog::from_times(times)?,
        user_ids: user_index.ids,
        page_ids: page_index.ids,
    })
}
