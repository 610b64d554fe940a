//! Core library functions for the lockstep detector

pub mod config;
pub mod data;
pub mod error;
pub mod lockstep;
pub mod storage;

pub use anyhow::{anyhow, Result};
pub use config::Config;
pub use data::{load_interaction_log, InteractionLog, LabeledLog};
pub use error::{LockstepError, LockstepResult};
pub use lockstep::{
    ClusterDriver, ClusterState, LockstepReport, RunStatus, Seed, SubspaceStrategy,
};
