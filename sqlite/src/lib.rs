//! Fluent SQLite query building and live-schema reconciliation.
//!
//! This crate is the SQLite backend for the fluentlite data model. It
//! exposes three entry points:
//!
//! - **[`Database`]** — the shared connection handle with an explicit
//!   open/close lifecycle, plus the raw multi-statement passthrough
//!   ([`Database::run_script`]).
//! - **[`TableQuery`]** — a chainable, one-shot query builder per table:
//!   condition tree with AND/OR mixing and parenthesized groups, joins,
//!   aggregates, grouping, ordering, pagination, and the terminal
//!   operations `get`/`first`/`find`/`insert`/`update`/`delete` plus
//!   `create`/`drop_table`.
//! - **[`TableColumns`]** — the migration planner: introspects live
//!   columns, diffs them against declared
//!   [`ColumnSpec`](fluentlite_core::ColumnSpec)s, and emits the statement
//!   sequence to reconcile them. Alterations SQLite cannot perform in
//!   place run as a transactional rename → create → copy → drop rebuild
//!   that preserves every unrelated column and its data.
//!
//! # Quick start
//!
//! ```no_run
//! use fluentlite_core::{ColumnSpec, Comparison};
//! use fluentlite_sqlite::Database;
//!
//! let db = Database::open("app.db").unwrap();
//!
//! db.table("users")
//!     .create(&[
//!         ColumnSpec::new("id", "INTEGER").primary().autoincrement(),
//!         ColumnSpec::new("name", "VARCHAR").with_length(120),
//!         ColumnSpec::new("age", "INTEGER").with_default(0),
//!     ])
//!     .unwrap();
//!
//! let adults = db
//!     .table("users")
//!     .where_("age", Comparison::GtEq, 18)
//!     .or_where("vip", Comparison::Eq, true)
//!     .get()
//!     .unwrap();
//! println!("{} rows", adults.len());
//! ```
//!
//! # Literal rendering
//!
//! Statements are rendered as text with single-quoted, **unescaped**
//! string literals — a compatibility contract with the wire surface this
//! layer replaces, not a security model. The rendering is isolated in one
//! internal function so a parameterized implementation can be substituted
//! without changing the chaining API. Do not feed untrusted strings into
//! queries built by this crate.

mod connection;
mod convert;
mod error;
mod migration;
mod query;
mod render;

pub use connection::{DATABASE_ENV, Database};
pub use error::{Result, SqliteError};
pub use migration::{ColumnInfo, LiveColumns, TableColumns};
pub use query::TableQuery;
