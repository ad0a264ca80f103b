//! Error types for SQLite query and migration operations.
//!
//! Provides a unified error type covering engine failures, input
//! validation, and migration failures.

use fluentlite_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while building or executing statements.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite engine failure, propagated unchanged.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Malformed caller input, rejected before any statement was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `update`/`delete` called without any WHERE condition.
    #[error("{operation} requires at least one WHERE condition")]
    MissingWhereClause {
        /// The guarded operation (`update` or `delete`).
        operation: &'static str,
    },

    /// Structural problem in a column spec or parseable token.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Schema reconciliation failure.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database location could not be resolved from the environment.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SqliteError {
    /// Collapses a non-empty validation report into one error.
    pub(crate) fn from_validation(errors: Vec<ValidationError>) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        SqliteError::InvalidInput(joined)
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
