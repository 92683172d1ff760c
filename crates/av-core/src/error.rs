//! Framework error type.
//!
//! Sub-crates define their own error enums (`PathError`, `SimError`) for
//! their own failure modes; `CoreError` covers faults in the shared
//! foundations, today map-text parsing.  Nothing in the engine treats
//! errors as fatal: every runtime failure degrades to a visible agent
//! state (Waiting/Removed).

use thiserror::Error;

/// The base error type shared by the `av-*` crates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A map-text row differs in width from the first row.
    #[error("map row {row} is {len} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// A map-text cell uses a code no cell kind maps to.
    #[error("unknown map code '{code}' in row {row}")]
    UnknownCode { code: char, row: usize },

    /// A map with no rows at all.
    #[error("map has no rows")]
    EmptyMap,
}

/// Shorthand result type.
pub type CoreResult<T> = Result<T, CoreError>;
