//! The shared connection handle.
//!
//! One [`Database`] is constructed at process start and lent to every
//! table-scoped builder — an explicit, lifetime-scoped stand-in for the
//! singleton of dynamic ORMs. The handle also carries the raw
//! multi-statement passthrough ([`Database::run_script`]).

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::convert::query_records;
use crate::error::{Result, SqliteError};
use crate::migration::TableColumns;
use crate::query::TableQuery;

/// Environment variable naming the database file (without extension).
pub const DATABASE_ENV: &str = "SQLITE_DATABASE";

/// Handle to one SQLite database.
///
/// Wraps a single [`rusqlite::Connection`]; every [`TableQuery`] and
/// [`TableColumns`] borrows it, so the process shares one connection with
/// an explicit open/close lifecycle. The engine serializes statement
/// execution internally — this layer adds no locking, and callers must
/// serialize schema migrations against concurrent writers themselves.
///
/// # Examples
///
/// ```no_run
/// use fluentlite_sqlite::Database;
/// use fluentlite_core::Comparison;
///
/// let db = Database::open("app.db").unwrap();
/// let adults = db
///     .table("users")
///     .where_("age", Comparison::GtEq, 18)
///     .get()
///     .unwrap();
/// println!("{} adults", adults.len());
/// ```
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if necessary) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Opens the database named by the `SQLITE_DATABASE` environment
    /// variable, with a `.db` suffix appended.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Config`] when the variable is unset or empty.
    pub fn open_env() -> Result<Self> {
        let name = std::env::var(DATABASE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SqliteError::Config(format!("{DATABASE_ENV} is not set")))?;
        Self::open(format!("{name}.db"))
    }

    /// Returns a query builder scoped to `table`.
    pub fn table(&self, table: impl Into<String>) -> TableQuery<'_> {
        TableQuery::new(&self.conn, table.into())
    }

    /// Returns the migration planner scoped to `table`.
    ///
    /// Equivalent to `db.table(name).columns()`.
    pub fn columns(&self, table: impl Into<String>) -> TableColumns<'_> {
        TableColumns::new(&self.conn, table.into())
    }

    /// Executes a raw multi-statement script.
    ///
    /// The input is split on `;`, fragments are trimmed and empty ones
    /// dropped, and the remainder execute sequentially. The first failure
    /// aborts the rest and is returned; already-executed fragments remain
    /// applied (no wrapping transaction).
    pub fn run_script(&self, script: &str) -> Result<()> {
        for fragment in script.split(';') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            query_records(&self.conn, fragment)?;
        }
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the handle and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Closes the connection, surfacing any pending engine error.
    pub fn close(self) -> Result<()> {
        debug!("closing database connection");
        self.conn.close().map_err(|(_conn, err)| SqliteError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_script_splits_and_skips_blanks() {
        let db = Database::open_in_memory().unwrap();
        db.run_script(
            "CREATE TABLE t (a INTEGER); ; \n INSERT INTO t VALUES (1); INSERT INTO t VALUES (2);",
        )
        .unwrap();

        let rows = db.table("t").get().unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn run_script_aborts_on_first_failure() {
        let db = Database::open_in_memory().unwrap();
        let result = db.run_script(
            "CREATE TABLE t (a INTEGER); INSERT INTO nope VALUES (1); INSERT INTO t VALUES (1);",
        );
        assert!(result.is_err());

        // The fragment before the failure was applied; the one after was not.
        let rows = db.table("t").get().unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn open_env_requires_variable() {
        // Runs without SQLITE_DATABASE set in the test environment.
        if std::env::var(DATABASE_ENV).is_err() {
            assert!(matches!(
                Database::open_env(),
                Err(SqliteError::Config(_))
            ));
        }
    }

    #[test]
    fn close_succeeds_on_idle_connection() {
        let db = Database::open_in_memory().unwrap();
        db.close().unwrap();
    }
}
