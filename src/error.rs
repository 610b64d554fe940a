//! Error types for the lockstep detector

use thiserror::Error;

/// Errors raised while loading an interaction log or running the detector
#[derive(Error, Debug)]
pub enum LockstepError {
    /// Detector parameters outside their valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A text row whose width differs from the first row
    #[error("Malformed row at line {line}: expected {expected} columns, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A cell that is not a finite, non-negative real
    #[error("Invalid timestamp at line {line}, column {column}: {value:?}")]
    InvalidTimestamp {
        line: usize,
        column: usize,
        value: String,
    },

    /// Input contained no users or no pages
    #[error("Interaction log is empty")]
    EmptyLog,

    /// Event table is missing a required column
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// No users interacted with the page inside the candidate set
    #[error("No qualifying users for page {page}")]
    EmptyDimension { page: usize },

    /// Seed or center vector does not match the log width
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Binary codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Parquet error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type LockstepResult<T> = std::result::Result<T, LockstepError>;
