//! Error types shared by the score model and both alignment engines.
//!
//! Both engines validate their inputs up front and fail with the same error
//! kind on the same malformed input, so callers can swap one engine for the
//! other without changing their error handling.

use thiserror::Error;

/// Errors reported by score-model construction and by `align()`.
#[derive(Debug, Error)]
pub enum AlignError {
    /// The score model itself is malformed (table shape mismatch, duplicate
    /// alphabet symbols, inconsistent indel column, ...).
    #[error("score model configuration error: {0}")]
    Configuration(String),

    /// A sequence contains a symbol the score model has no entry for and no
    /// default mismatch score is configured.
    #[error("symbol '{symbol}' at position {position} has no score entry")]
    InvalidInput { symbol: char, position: usize },

    /// Reading a score-matrix file failed.
    #[error("failed to read score matrix: {0}")]
    Io(#[from] std::io::Error),

    /// A score-matrix file is syntactically malformed.
    #[error("malformed score matrix at line {line}: {reason}")]
    MatrixFormat { line: usize, reason: String },
}
