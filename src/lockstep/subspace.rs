//! Greedy page swapping

use ndarray::Array1;
use rayon::prelude::*;

use crate::config::Config;
use crate::data::InteractionLog;
use crate::lockstep::finder::UserFinder;
use crate::lockstep::{Subspace, SubspaceStrategy, UserSet};

/// Page count above which singleton user sets are evaluated in parallel
const PARALLEL_PAGE_THRESHOLD: usize = 1000;

/// Result of one subspace search pass
#[derive(Debug, Clone, PartialEq)]
pub struct SubspaceUpdate {
    pub subspace: Subspace,

    /// Best user set of the last slot evaluated
    pub suspected_users: UserSet,
}

/// Propose, slot by slot, an out-of-subspace page whose matching users
/// cover the slot's own.
///
/// A candidate is adopted when its user set is non-empty and a superset of
/// (or equal to) the best set so far for that slot, scanning candidates in
/// page order. Only users matching the current subspace are considered.
pub fn update_subspace(
    log: &InteractionLog,
    config: &Config,
    center: &Array1<f64>,
    current: &Subspace,
) -> SubspaceUpdate {
    let finder = UserFinder::new(log, config);
    let base = finder.find_users(0..log.user_count(), center, current);

    let parallel = log.page_count() >= PARALLEL_PAGE_THRESHOLD;
    let singletons = singleton_user_sets(&finder, &base, center, parallel);

    let mut subspace = current.clone();
    let mut suspected_users = UserSet::new();

    for &slot in current {
        let mut winner = slot;
        let mut best = &singletons[slot];

        for (page, users) in singletons.iter().enumerate() {
            if subspace.contains(&page) {
                continue;
            }
            if !users.is_empty() && best.is_subset(users) {
                winner = page;
                best = users;
            }
        }

        if winner != slot {
            log::debug!(
                "Page {} covers page {} ({} users)",
                winner,
                slot,
                best.len()
            );
        }

        match config.strategy {
            SubspaceStrategy::Replace => {
                subspace.remove(&slot);
                subspace.insert(winner);
            }
            SubspaceStrategy::Union => {
                subspace.insert(winner);
            }
        }
        suspected_users = best.clone();
    }

    SubspaceUpdate {
        subspace,
        suspected_users,
    }
}

/// Users from `base` matching `center` on each single page, indexed by page
fn singleton_user_sets(
    finder: &UserFinder<'_>,
    base: &UserSet,
    center: &Array1<f64>,
    parallel: bool,
) -> Vec<UserSet> {
    let page_count = finder.log().page_count();
    let on_page =
        |page: usize| finder.find_users(base.iter().copied(), center, &Subspace::from([page]));

    if parallel {
        // Collect keeps page order, so the fold above stays deterministic
        (0..page_count).into_par_iter().map(on_page).collect()
    } else {
        (0..page_count).map(on_page).collect()
    }
}
