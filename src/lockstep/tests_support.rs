//! Shared fixtures for lockstep tests

use ndarray::{array, Array2};
use rand::Rng;

use crate::data::InteractionLog;

/// Five users, five pages; users 1 and 3 move together on pages 1 and 3
pub fn toy_log() -> InteractionLog {
    InteractionLog::from_times(array![
        [0.0, 0.0, 0.0, 0.0, 0.2],
        [0.0, 1.1, 0.0, 3.1, 0.0],
        [0.0, 0.0, 0.9, 0.0, 0.1],
        [0.0, 0.7, 0.0, 3.3, 0.1],
        [1.1, 0.0, 0.0, 0.0, 0.0],
    ])
    .unwrap()
}

/// Sparse log where each cell is filled with probability `density`
pub fn random_log<R: Rng>(rng: &mut R, users: usize, pages: usize, density: f64) -> InteractionLog {
    let times = Array2::from_shape_fn((users, pages), |_| {
        if rng.gen_bool(density) {
            rng.gen_range(0.1..10.0)
        } else {
            0.0
        }
    });
    InteractionLog::from_times(times).unwrap()
}
