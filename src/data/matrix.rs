//! Dense user × page interaction matrix

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{LockstepError, LockstepResult};

/// Row index into the interaction log
pub type UserIdx = usize;

/// Column index into the interaction log
pub type PageIdx = usize;

/// Immutable view of who interacted with which page, and when.
///
/// `times[[i, j]] == 0.0` means user `i` never touched page `j`. The
/// boolean adjacency is derived once at construction so the hot loops
/// never compare floats against zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionLog {
    times: Array2<f64>,
    adjacency: Array2<bool>,
}

impl InteractionLog {
    /// Build a log from a timestamp matrix, rejecting negative or non-finite cells
    pub fn from_times(times: Array2<f64>) -> LockstepResult<Self> {
        if times.nrows() == 0 || times.ncols() == 0 {
            return Err(LockstepError::EmptyLog);
        }

        if let Some(((line, column), value)) = times
            .indexed_iter()
            .find(|(_, &t)| !t.is_finite() || t < 0.0)
        {
            return Err(LockstepError::InvalidTimestamp {
                line: line + 1,
                column: column + 1,
                value: value.to_string(),
            });
        }

        let adjacency = times.mapv(|t| t > 0.0);
        Ok(Self { times, adjacency })
    }

    /// Number of users (rows)
    pub fn user_count(&self) -> usize {
        self.times.nrows()
    }

    /// Number of pages (columns)
    pub fn page_count(&self) -> usize {
        self.times.ncols()
    }

    pub fn interacted(&self, user: UserIdx, page: PageIdx) -> bool {
        self.adjacency[[user, page]]
    }

    pub fn time(&self, user: UserIdx, page: PageIdx) -> f64 {
        self.times[[user, page]]
    }

    /// Users who interacted with `page`, in index order
    pub fn page_users(&self, page: PageIdx) -> Vec<UserIdx> {
        self.adjacency
            .column(page)
            .iter()
            .enumerate()
            .filter(|(_, &hit)| hit)
            .map(|(user, _)| user)
            .collect()
    }

    /// Total number of recorded interactions
    pub fn interaction_count(&self) -> usize {
        self.adjacency.iter().filter(|&&hit| hit).count()
    }

    pub fn times(&self) -> &Array2<f64> {
        &self.times
    }

    pub fn adjacency(&self) -> &Array2<bool> {
        &self.adjacency
    }
}
