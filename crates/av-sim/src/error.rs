//! Simulation-level error type.

use thiserror::Error;

use av_path::PathError;

/// Errors produced by `av-sim`.
///
/// Only construction and output can fail; nothing that happens inside the
/// tick loop is fatal (a failed route degrades to a waiting agent).
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("grid has no start marker")]
    NoStart,

    #[error("grid has no goal marker")]
    NoGoal,

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SimResult<T> = Result<T, SimError>;
