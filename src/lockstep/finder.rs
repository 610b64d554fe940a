//! Selection of users whose interactions line up with a center

use ndarray::Array1;

use crate::config::Config;
use crate::data::{InteractionLog, PageIdx, UserIdx};
use crate::lockstep::{Subspace, UserSet};

/// One page on which a wider time deviation is accepted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relaxation {
    pub page: PageIdx,
    pub tolerance: f64,
}

/// Qualifying users plus the per-user match count behind the decision
#[derive(Debug, Clone)]
pub struct UserMatch {
    pub users: UserSet,

    /// Indexed by user; zero for users outside the candidate set
    pub weights: Vec<usize>,
}

/// Read-only matcher over an interaction log
pub struct UserFinder<'a> {
    log: &'a InteractionLog,
    tolerance: f64,
    min_weight: f64,
}

impl<'a> UserFinder<'a> {
    pub fn new(log: &'a InteractionLog, config: &Config) -> Self {
        Self {
            log,
            tolerance: config.dt,
            min_weight: config.min_weight(),
        }
    }

    pub fn log(&self) -> &'a InteractionLog {
        self.log
    }

    /// Users among `candidates` matching `center` on enough subspace pages
    pub fn find_users<I>(
        &self,
        candidates: I,
        center: &Array1<f64>,
        subspace: &Subspace,
    ) -> UserSet
    where
        I: IntoIterator<Item = UserIdx>,
    {
        self.scan(candidates, center, subspace, None).users
    }

    /// Like [`find_users`](Self::find_users) with one relaxed page, also
    /// returning the weight vector
    pub fn find_users_weighted<I>(
        &self,
        candidates: I,
        center: &Array1<f64>,
        subspace: &Subspace,
        relaxation: Relaxation,
    ) -> UserMatch
    where
        I: IntoIterator<Item = UserIdx>,
    {
        self.scan(candidates, center, subspace, Some(relaxation))
    }

    fn scan<I>(
        &self,
        candidates: I,
        center: &Array1<f64>,
        subspace: &Subspace,
        relaxation: Option<Relaxation>,
    ) -> UserMatch
    where
        I: IntoIterator<Item = UserIdx>,
    {
        let mut weights = vec![0usize; self.log.user_count()];
        let mut users = UserSet::new();
        // A lone page can never reach phi * m, so any hit counts there
        let degenerate = subspace.len() <= 1;

        for user in candidates {
            let weight = subspace
                .iter()
                .filter(|&&page| self.matches(user, page, center[page], relaxation))
                .count();
            weights[user] = weight;

            if weight as f64 >= self.min_weight || (degenerate && weight > 0) {
                users.insert(user);
            }
        }

        UserMatch { users, weights }
    }

    fn matches(
        &self,
        user: UserIdx,
        page: PageIdx,
        center: f64,
        relaxation: Option<Relaxation>,
    ) -> bool {
        if !self.log.interacted(user, page) {
            return false;
        }

        let deviation = (center - self.log.time(user, page)).abs();
        deviation <= self.tolerance
            || relaxation.map_or(false, |r| r.page == page && deviation <= r.tolerance)
    }
}
