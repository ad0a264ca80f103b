//! Core data model for the fluentlite query builder and migration planner.
//!
//! This crate defines the backend-independent types:
//!
//! - [`Value`] — one SQL literal (null, bool, integer, real, text).
//! - [`Comparison`], [`Connector`], [`JoinKind`], [`OrderDirection`] — the
//!   closed token vocabulary of the chaining API.
//! - [`ConditionSet`] — the WHERE-tree accumulator with the one-shot
//!   pending-connector state machine and parenthesized groups.
//! - [`QueryShape`] — plain select vs. the aggregate forms.
//! - [`ColumnSpec`] / [`DefaultValue`] / [`ColumnOptions`] — a declared
//!   table column with its modifiers and optional foreign key.
//! - [`Record`] — one row of data, keyed by column name.
//!
//! Validation ([`validate_column_spec`], [`validate_column_specs`]) catches
//! structural errors before any SQL is rendered. SQL rendering itself lives
//! in the backend crate; nothing here depends on a database driver.
//!
//! # Example
//!
//! ```
//! use fluentlite_core::*;
//!
//! let mut set = ConditionSet::new();
//! set.push_compare("age", Comparison::Gt, 18);
//! set.push_or_compare("vip", Comparison::Eq, true);
//! assert_eq!(set.nodes().len(), 2);
//!
//! let spec = ColumnSpec::new("email", "VARCHAR").with_length(120).unique();
//! assert!(validate_column_spec(&spec).is_empty());
//! ```

mod condition;
mod types;
mod validate;

pub use condition::{Condition, ConditionKind, ConditionNode, ConditionSet};
pub use types::*;
pub use validate::{ValidationError, validate_column_spec, validate_column_specs};
