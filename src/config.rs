//! Configuration management for the lockstep detector

use serde::{Deserialize, Serialize};

use crate::error::{LockstepError, LockstepResult};
use crate::lockstep::SubspaceStrategy;

/// Parameters of a single detection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of users the ring is expected to contain
    pub n: usize,

    /// Number of pages attributed to the ring
    pub m: usize,

    /// Width of the time window in which the ring acts
    pub dt: f64,

    /// Fraction of the `m` pages a user must match to be suspected
    pub phi: f64,

    /// Loosening factor applied to `dt` for the density window
    pub beta: f64,

    /// Multiple of `dt` allowed on the dimension being re-estimated
    pub relaxed_factor: f64,

    /// Iteration bound before the run is reported unconverged
    pub max_iterations: usize,

    /// How the subspace searcher folds winners into the subspace
    pub strategy: SubspaceStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n: 2,
            m: 2,
            dt: 1.0,
            phi: 1.0,
            beta: 2.0,
            relaxed_factor: 2.0,
            max_iterations: 100,
            strategy: SubspaceStrategy::Replace,
        }
    }
}

impl Config {
    /// Create a configuration from the four detector thresholds
    pub fn new(n: usize, m: usize, dt: f64, phi: f64) -> Self {
        Self {
            n,
            m,
            dt,
            phi,
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: SubspaceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Minimum per-user weight for a user to qualify
    pub fn min_weight(&self) -> f64 {
        self.phi * self.m as f64
    }

    /// Width of the sliding window used by the center estimator
    pub fn window_width(&self) -> f64 {
        self.beta * self.dt
    }

    /// Tolerance granted to the relaxed dimension during center updates
    pub fn relaxed_tolerance(&self) -> f64 {
        self.relaxed_factor * self.dt
    }

    /// Reject parameter combinations the detector cannot run with
    pub fn validate(&self) -> LockstepResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(LockstepError::InvalidConfig(format!(
                "dt must be a positive real, got {}",
                self.dt
            )));
        }
        if !(self.phi > 0.0 && self.phi <= 1.0) {
            return Err(LockstepError::InvalidConfig(format!(
                "phi must lie in (0, 1], got {}",
                self.phi
            )));
        }
        if self.m == 0 {
            return Err(LockstepError::InvalidConfig(
                "m must be at least 1".to_string(),
            ));
        }
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(LockstepError::InvalidConfig(format!(
                "beta must be a positive real, got {}",
                self.beta
            )));
        }
        if !self.relaxed_factor.is_finite() || self.relaxed_factor < 1.0 {
            return Err(LockstepError::InvalidConfig(format!(
                "relaxed factor must be at least 1, got {}",
                self.relaxed_factor
            )));
        }
        if self.max_iterations == 0 {
            return Err(LockstepError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
