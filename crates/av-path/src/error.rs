//! Pathfinding error type.

use thiserror::Error;

use av_core::Cell;

/// Errors produced by `av-path`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("no route from {from} to {to}")]
    NoPath { from: Cell, to: Cell },

    #[error("search exceeded the {budget}-node budget")]
    BudgetExceeded { budget: usize },
}

pub type PathResult<T> = Result<T, PathError>;
