//! Initial center and subspace

use ndarray::Array1;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::{InteractionLog, PageIdx};
use crate::error::LockstepResult;
use crate::lockstep::{ClusterState, Subspace};

/// Where the first hypothesis comes from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Seed {
    /// Caller-supplied center (one value per page) and subspace
    Explicit {
        center: Vec<f64>,
        subspace: Vec<PageIdx>,
    },
    /// Every page, centered on its mean interaction time
    #[default]
    FullSubspace,
    /// `m` random pages, each centered on a random interaction of its own
    Random { seed: u64 },
}

impl Seed {
    pub fn initial_state(
        &self,
        log: &InteractionLog,
        config: &Config,
    ) -> LockstepResult<ClusterState> {
        let page_count = log.page_count();

        match self {
            Seed::Explicit { center, subspace } => {
                let state = ClusterState::seeded(
                    Array1::from_vec(center.clone()),
                    subspace.iter().copied().collect(),
                );
                state.check_dimensions(page_count)?;
                Ok(state)
            }
            Seed::FullSubspace => {
                let center = Array1::from_shape_fn(page_count, |page| {
                    let users = log.page_users(page);
                    if users.is_empty() {
                        0.0
                    } else {
                        let total: f64 = users.iter().map(|&u| log.time(u, page)).sum();
                        total / users.len() as f64
                    }
                });
                Ok(ClusterState::seeded(center, (0..page_count).collect()))
            }
            Seed::Random { seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                let amount = config.m.min(page_count);
                let subspace: Subspace =
                    index::sample(&mut rng, page_count, amount).into_iter().collect();

                let mut center = Array1::zeros(page_count);
                for &page in &subspace {
                    let users = log.page_users(page);
                    if !users.is_empty() {
                        let user = users[rng.gen_range(0..users.len())];
                        center[page] = log.time(user, page);
                    }
                }

                log::debug!("Random seed {} picked pages {:?}", seed, subspace);
                Ok(ClusterState::seeded(center, subspace))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LockstepError;
    use crate::lockstep::tests_support::toy_log;

    #[test]
    fn test_explicit_seed() {
        let log = toy_log();
        let seed = Seed::Explicit {
            center: vec![0.0, 1.0, 0.0, 3.0, 0.0],
            subspace: vec![1, 3],
        };
        let state = seed.initial_state(&log, &Config::default()).unwrap();
        assert_eq!(state.subspace, Subspace::from([1, 3]));
        assert_eq!(state.center[3], 3.0);
        assert_eq!(state.iteration, 0);
        assert!(state.suspected_users.is_empty());
    }

    #[test]
    fn test_explicit_seed_validated_against_log() {
        let log = toy_log();
        let short = Seed::Explicit {
            center: vec![0.0; 3],
            subspace: vec![0],
        };
        assert!(short.initial_state(&log, &Config::default()).is_err());

        let out_of_range = Seed::Explicit {
            center: vec![0.0; 5],
            subspace: vec![5],
        };
        assert!(matches!(
            out_of_range.initial_state(&log, &Config::default()),
            Err(LockstepError::DimensionMismatch { expected: 5, found: 6 })
        ));
    }

    #[test]
    fn test_full_subspace_uses_page_means() {
        let log = toy_log();
        let state = Seed::FullSubspace.initial_state(&log, &Config::default()).unwrap();
        assert_eq!(state.subspace.len(), 5);
        assert_eq!(state.center[0], 1.1);
        assert!((state.center[1] - 0.9).abs() < 1e-12);
        assert!((state.center[3] - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_random_seed_is_reproducible() {
        let log = toy_log();
        let config = Config::default();

        let a = Seed::Random { seed: 9 }.initial_state(&log, &config).unwrap();
        let b = Seed::Random { seed: 9 }.initial_state(&log, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.subspace.len(), config.m);

        for &page in &a.subspace {
            let value = a.center[page];
            let hit = log.page_users(page).iter().any(|&u| log.time(u, page) == value);
            assert!(value == 0.0 || hit);
        }
    }
}
