//! Fixed-point loop over center and subspace updates

use crate::config::Config;
use crate::data::InteractionLog;
use crate::error::LockstepResult;
use crate::lockstep::center::update_center;
use crate::lockstep::subspace::update_subspace;
use crate::lockstep::{ClusterState, LockstepReport, RunStatus};

/// Owns one detection run over a log
pub struct ClusterDriver<'a> {
    log: &'a InteractionLog,
    config: &'a Config,
}

impl<'a> ClusterDriver<'a> {
    pub fn new(log: &'a InteractionLog, config: &'a Config) -> LockstepResult<Self> {
        config.validate()?;
        Ok(Self { log, config })
    }

    /// One center update followed by one subspace search
    pub fn step(&self, state: &ClusterState) -> LockstepResult<ClusterState> {
        state.check_dimensions(self.log.page_count())?;

        let center = update_center(self.log, self.config, &state.center, &state.subspace);
        let update = update_subspace(self.log, self.config, &center, &state.subspace);

        Ok(ClusterState {
            center,
            subspace: update.subspace,
            suspected_users: update.suspected_users,
            iteration: state.iteration + 1,
        })
    }

    /// Iterate from `initial` until a fixed point or the iteration bound
    pub fn run(&self, initial: ClusterState) -> LockstepResult<LockstepReport> {
        initial.check_dimensions(self.log.page_count())?;

        log::info!(
            "Starting lockstep search over {} users and {} pages (subspace of {})",
            self.log.user_count(),
            self.log.page_count(),
            initial.subspace.len()
        );

        let mut state = initial;
        let mut status = RunStatus::Running;

        while !status.is_terminal() {
            let next = self.step(&state)?;
            log::debug!(
                "Iteration {}: subspace {:?}, {} suspected users",
                next.iteration,
                next.subspace,
                next.suspected_users.len()
            );

            if next.is_fixed_point_of(&state) {
                status = RunStatus::Converged;
            } else if next.iteration >= self.config.max_iterations {
                log::warn!(
                    "No convergence after {} iterations; reporting last state",
                    next.iteration
                );
                status = RunStatus::NonConverged;
            }
            state = next;
        }

        log::info!(
            "Lockstep search finished ({:?}) after {} iterations with {} suspected users",
            status,
            state.iteration,
            state.suspected_users.len()
        );

        Ok(LockstepReport { state, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LockstepError;
    use crate::lockstep::tests_support::{random_log, toy_log};
    use crate::lockstep::{Seed, Subspace, SubspaceStrategy, UserSet};
    use ndarray::{array, Array1};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn toy_seed() -> ClusterState {
        ClusterState::seeded(array![0.0, 1.0, 0.0, 3.0, 0.0], (0..5).collect())
    }

    #[test]
    fn test_toy_run_converges() {
        let log = toy_log();
        let config = Config::default();
        let driver = ClusterDriver::new(&log, &config).unwrap();

        let report = driver.run(toy_seed()).unwrap();

        assert!(report.converged());
        assert_eq!(report.state.iteration, 2);
        assert_eq!(report.state.subspace, (0..5).collect::<Subspace>());
        assert_eq!(report.state.suspected_users, UserSet::from([2, 3]));

        let expected = [0.0, 0.55, 0.45, 3.2, 0.05];
        for (got, want) in report.state.center.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fixed_point_is_idempotent() {
        let log = toy_log();
        let config = Config::default();
        let driver = ClusterDriver::new(&log, &config).unwrap();

        let report = driver.run(toy_seed()).unwrap();
        let again = driver.step(&report.state).unwrap();
        assert!(again.is_fixed_point_of(&report.state));
        assert_eq!(again.suspected_users, report.state.suspected_users);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let log = toy_log();
        let config = Config::default();
        let driver = ClusterDriver::new(&log, &config).unwrap();

        let first = driver.run(toy_seed()).unwrap();
        let second = driver.run(toy_seed()).unwrap();
        assert_eq!(first.state, second.state);
        assert_eq!(first.status, second.status);
    }

    #[test]
    fn test_iteration_bound_reports_non_converged() {
        let log = toy_log();
        let config = Config::default().with_max_iterations(1);
        let driver = ClusterDriver::new(&log, &config).unwrap();

        let report = driver.run(toy_seed()).unwrap();
        assert_eq!(report.status, RunStatus::NonConverged);
        assert_eq!(report.state.iteration, 1);
        // Last computed state is surfaced, not the seed
        assert_eq!(report.state.suspected_users, UserSet::from([2, 3]));
    }

    #[test]
    fn test_mismatched_state_rejected() {
        let log = toy_log();
        let config = Config::default();
        let driver = ClusterDriver::new(&log, &config).unwrap();

        let short = ClusterState::seeded(array![0.0, 1.0, 0.0], (0..5).collect());
        assert!(matches!(
            driver.run(short.clone()),
            Err(LockstepError::DimensionMismatch { expected: 5, found: 3 })
        ));
        assert!(matches!(
            driver.step(&short),
            Err(LockstepError::DimensionMismatch { expected: 5, found: 3 })
        ));

        let outside = ClusterState::seeded(Array1::zeros(5), Subspace::from([1, 7]));
        assert!(matches!(
            driver.run(outside),
            Err(LockstepError::DimensionMismatch { expected: 5, found: 8 })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let log = toy_log();
        let config = Config::new(2, 2, -1.0, 1.0);
        assert!(ClusterDriver::new(&log, &config).is_err());
    }

    #[test]
    fn test_random_logs_terminate_within_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for trial in 0..10u64 {
            let log = random_log(&mut rng, 25, 12, 0.3);
            let strategy = if trial % 2 == 0 {
                SubspaceStrategy::Replace
            } else {
                SubspaceStrategy::Union
            };
            let config = Config::new(3, 3, 1.0, 0.67).with_strategy(strategy);
            let driver = ClusterDriver::new(&log, &config).unwrap();
            let initial = Seed::Random { seed: trial }.initial_state(&log, &config).unwrap();

            let report = driver.run(initial).unwrap();
            assert!(report.status.is_terminal());
            assert!(report.state.iteration <= config.max_iterations);
            assert_eq!(report.state.center.len(), log.page_count());
        }
    }

    #[test]
    fn test_empty_match_keeps_center() {
        let log = toy_log();
        let config = Config::default();
        let driver = ClusterDriver::new(&log, &config).unwrap();
        let far = ClusterState::seeded(Array1::from_elem(5, 100.0), (0..5).collect());

        let report = driver.run(far.clone()).unwrap();
        assert!(report.converged());
        assert_eq!(report.state.center, far.center);
        assert!(report.state.suspected_users.is_empty());
    }
}
