//! Lockstep (coordinated timing) cluster search
//!
//! Alternates between re-estimating the per-page temporal center of a
//! suspected group and greedily swapping pages in and out of the
//! candidate subspace, until both stop changing.

pub mod center;
pub mod driver;
pub mod finder;
pub mod seed;
pub mod subspace;

#[cfg(test)]
pub(crate) mod tests_support;

use std::collections::BTreeSet;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::data::{PageIdx, UserIdx};
use crate::error::{LockstepError, LockstepResult};

pub use center::{estimate_dimension, update_center, WindowEstimate};
pub use driver::ClusterDriver;
pub use finder::{Relaxation, UserFinder, UserMatch};
pub use seed::Seed;
pub use subspace::{update_subspace, SubspaceUpdate};

/// Pages hypothesised to be targeted by the ring
pub type Subspace = BTreeSet<PageIdx>;

/// Users currently judged to belong to the ring
pub type UserSet = BTreeSet<UserIdx>;

/// How a winning page is folded into the subspace
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SubspaceStrategy {
    /// The winner takes the slot it was evaluated for; size stays fixed
    #[default]
    Replace,
    /// The winner joins the subspace alongside the slot; size only grows
    Union,
}

/// Everything the driver carries from one iteration to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterState {
    /// Estimated interaction time per page (meaningful on subspace pages)
    pub center: Array1<f64>,

    pub subspace: Subspace,

    pub suspected_users: UserSet,

    /// Number of completed iterations
    pub iteration: usize,
}

impl ClusterState {
    /// Initial hypothesis before any iteration has run
    pub fn seeded(center: Array1<f64>, subspace: Subspace) -> Self {
        Self {
            center,
            subspace,
            suspected_users: UserSet::new(),
            iteration: 0,
        }
    }

    /// Fails unless the center has one value per page and every subspace
    /// page exists
    pub fn check_dimensions(&self, page_count: usize) -> LockstepResult<()> {
        if self.center.len() != page_count {
            return Err(LockstepError::DimensionMismatch {
                expected: page_count,
                found: self.center.len(),
            });
        }
        if let Some(&page) = self.subspace.iter().find(|&&page| page >= page_count) {
            return Err(LockstepError::DimensionMismatch {
                expected: page_count,
                found: page + 1,
            });
        }
        Ok(())
    }

    /// True when center is bitwise-identical and subspace is equal
    pub fn is_fixed_point_of(&self, previous: &ClusterState) -> bool {
        self.subspace == previous.subspace
            && self.center.len() == previous.center.len()
            && self
                .center
                .iter()
                .zip(previous.center.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Center values restricted to the subspace, in page order
    pub fn subspace_center(&self) -> Vec<(PageIdx, f64)> {
        self.subspace
            .iter()
            .map(|&page| (page, self.center[page]))
            .collect()
    }
}

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Converged,
    NonConverged,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// Final state of a run together with how it ended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockstepReport {
    pub state: ClusterState,
    pub status: RunStatus,
}

impl LockstepReport {
    pub fn converged(&self) -> bool {
        self.status == RunStatus::Converged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fixed_point_is_bitwise() {
        let a = ClusterState::seeded(array![0.0, 1.0], Subspace::from([0, 1]));
        let mut b = a.clone();
        assert!(b.is_fixed_point_of(&a));

        b.center[1] = 1.0 + f64::EPSILON;
        assert!(!b.is_fixed_point_of(&a));

        let mut c = a.clone();
        c.subspace.remove(&0);
        assert!(!c.is_fixed_point_of(&a));
    }

    #[test]
    fn test_signed_zero_differs() {
        let a = ClusterState::seeded(array![0.0], Subspace::from([0]));
        let b = ClusterState::seeded(array![-0.0], Subspace::from([0]));
        assert!(!b.is_fixed_point_of(&a));
    }

    #[test]
    fn test_dimensions_checked_against_page_count() {
        let state = ClusterState::seeded(array![0.0, 1.0, 0.0], Subspace::from([0, 2]));
        assert!(state.check_dimensions(3).is_ok());
        assert!(matches!(
            state.check_dimensions(5),
            Err(LockstepError::DimensionMismatch { expected: 5, found: 3 })
        ));

        let state = ClusterState::seeded(array![0.0, 1.0], Subspace::from([0, 3]));
        assert!(matches!(
            state.check_dimensions(2),
            Err(LockstepError::DimensionMismatch { expected: 2, found: 4 })
        ));
    }

    #[test]
    fn test_subspace_center() {
        let state = ClusterState::seeded(array![5.0, 6.0, 7.0], Subspace::from([2, 0]));
        assert_eq!(state.subspace_center(), vec![(0, 5.0), (2, 7.0)]);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Converged.is_terminal());
        assert!(RunStatus::NonConverged.is_terminal());
    }
}
