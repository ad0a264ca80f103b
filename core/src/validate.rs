//! Structural validation of declared column specifications.
//!
//! Catches spec errors — empty names, empty types, duplicate keys,
//! autoincrement on a non-primary column — before any SQL is built, so a
//! bad spec never reaches the connection.

use std::collections::HashSet;

use thiserror::Error;

use crate::ColumnSpec;

/// Structural problems in user-supplied input.
///
/// Covers declared column specs plus the parseable token types
/// ([`Comparison`](crate::Comparison), [`OrderDirection`](crate::OrderDirection)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Column key is empty or whitespace-only.
    #[error("column key cannot be empty")]
    EmptyKey,
    /// Column type is empty or whitespace-only.
    #[error("column '{0}' has an empty type")]
    EmptyType(String),
    /// Two specs in the same list share a key.
    #[error("duplicate column in spec list: {0}")]
    DuplicateColumn(String),
    /// AUTOINCREMENT declared without PRIMARY KEY.
    #[error("column '{0}' declares autoincrement without primary key")]
    AutoincrementWithoutPrimary(String),
    /// Unrecognized comparison operator token.
    #[error("invalid comparison operator: {0}")]
    InvalidComparison(String),
    /// Order direction is neither `ASC` nor `DESC`.
    #[error("invalid order direction: {0} (use ASC or DESC)")]
    InvalidDirection(String),
}

/// Validates a single column spec.
///
/// Returns every problem found rather than stopping at the first.
///
/// # Examples
///
/// ```
/// use fluentlite_core::{ColumnSpec, validate_column_spec};
///
/// assert!(validate_column_spec(&ColumnSpec::new("id", "INTEGER")).is_empty());
/// assert!(!validate_column_spec(&ColumnSpec::new("", "INTEGER")).is_empty());
/// ```
pub fn validate_column_spec(spec: &ColumnSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.key.trim().is_empty() {
        errors.push(ValidationError::EmptyKey);
    }
    if spec.column_type.trim().is_empty() {
        errors.push(ValidationError::EmptyType(spec.key.clone()));
    }
    if spec.options.autoincrement && !spec.options.primary {
        errors.push(ValidationError::AutoincrementWithoutPrimary(spec.key.clone()));
    }

    errors
}

/// Validates a spec list: each spec individually, plus key uniqueness.
pub fn validate_column_specs(specs: &[ColumnSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for spec in specs {
        if !seen.insert(spec.key.as_str()) {
            errors.push(ValidationError::DuplicateColumn(spec.key.clone()));
        }
        errors.extend(validate_column_spec(spec));
    }

    errors
}
