//! Temporal center estimation

use ndarray::{Array1, Axis};

use crate::config::Config;
use crate::data::{InteractionLog, PageIdx, UserIdx};
use crate::error::{LockstepError, LockstepResult};
use crate::lockstep::finder::{Relaxation, UserFinder};
use crate::lockstep::{Subspace, UserSet};

/// Densest time window found on one page
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEstimate {
    /// Users inside the window, ordered by timestamp
    pub members: Vec<UserIdx>,

    /// Midpoint of the earliest and latest member timestamps
    pub center: f64,

    pub total_weight: usize,
}

/// Find the heaviest window of width `width` on `page`.
///
/// Each member's timestamp is tried as the window's lower bound; the
/// window with the largest summed weight wins and ties go to the earliest
/// start. Users in `users` who never touched `page` sort in at `0.0`
/// and may join the window like anyone else.
pub fn estimate_dimension(
    log: &InteractionLog,
    users: &UserSet,
    weights: &[usize],
    page: PageIdx,
    width: f64,
) -> LockstepResult<WindowEstimate> {
    if users.is_empty() {
        return Err(LockstepError::EmptyDimension { page });
    }

    let mut sorted: Vec<(UserIdx, f64)> =
        users.iter().map(|&user| (user, log.time(user, page))).collect();

    // Stable, so equal timestamps keep user order
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut best: Option<(usize, usize, usize)> = None;
    for &(_, t_min) in &sorted {
        let t_max = t_min + width;
        let lo = sorted.partition_point(|&(_, t)| t < t_min);
        let hi = sorted.partition_point(|&(_, t)| t <= t_max);
        let total: usize = sorted[lo..hi].iter().map(|&(user, _)| weights[user]).sum();

        if best.map_or(true, |(_, _, best_total)| total > best_total) {
            best = Some((lo, hi, total));
        }
    }

    let (lo, hi, total_weight) = best.ok_or(LockstepError::EmptyDimension { page })?;
    let window = &sorted[lo..hi];
    let center = (window[0].1 + window[window.len() - 1].1) / 2.0;

    Ok(WindowEstimate {
        members: window.iter().map(|&(user, _)| user).collect(),
        center,
        total_weight,
    })
}

/// Re-estimate the whole center vector for `subspace`.
///
/// Every page first takes the mean timestamp of the currently matching
/// users; each subspace page is then refined to its own densest window,
/// found with that page relaxed to the configured wider tolerance.
pub fn update_center(
    log: &InteractionLog,
    config: &Config,
    center: &Array1<f64>,
    subspace: &Subspace,
) -> Array1<f64> {
    let finder = UserFinder::new(log, config);
    let base = finder.find_users(0..log.user_count(), center, subspace);
    if base.is_empty() {
        log::debug!("No users match the current center; keeping it");
        return center.clone();
    }

    let rows: Vec<UserIdx> = base.iter().copied().collect();
    let Some(mut updated) = log.times().select(Axis(0), &rows).mean_axis(Axis(0)) else {
        return center.clone();
    };

    for &page in subspace {
        let relaxation = Relaxation {
            page,
            tolerance: config.relaxed_tolerance(),
        };
        let found =
            finder.find_users_weighted(0..log.user_count(), center, subspace, relaxation);
        let estimate =
            estimate_dimension(log, &found.users, &found.weights, page, config.window_width());

        updated[page] = match estimate {
            Ok(estimate) => estimate.center,
            Err(err) => {
                log::warn!("{}; keeping previous center {}", err, center[page]);
                center[page]
            }
        };
    }

    updated
}
