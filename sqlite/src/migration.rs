//! Live-schema reconciliation for one table.
//!
//! [`TableColumns`] introspects a table's current columns, diffs them
//! against declared [`ColumnSpec`]s, and issues the statement sequence
//! needed to add, modify, or remove columns. SQLite cannot alter a column
//! in place, so any spec difference routes through a full rebuild:
//! rename → create → copy → drop, executed inside one transaction so a
//! mid-sequence failure rolls back to the original table instead of
//! leaving it renamed or duplicated.
//!
//! # Example
//!
//! ```no_run
//! use fluentlite_sqlite::Database;
//! use fluentlite_core::ColumnSpec;
//!
//! let db = Database::open("app.db").unwrap();
//! let columns = db.columns("users");
//!
//! // Idempotent: only missing columns are added.
//! columns.add(&[ColumnSpec::new("age", "INTEGER").with_default(0)]).unwrap();
//!
//! // Type change triggers the data-preserving rebuild.
//! columns.edit(&[ColumnSpec::new("age", "TEXT")]).unwrap();
//! ```

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use tracing::{info, warn};

use fluentlite_core::{ColumnSpec, validate_column_specs};

use crate::convert::query_records;
use crate::error::{Result, SqliteError};
use crate::render::{column_definition, default_as_stored, quote_ident};

/// One introspected column of a live table.
///
/// Sourced from `PRAGMA table_info`; the auto-increment flag is recovered
/// from the table's stored CREATE statement, which the pragma does not
/// expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type, verbatim (e.g. `VARCHAR(80)`).
    pub declared_type: String,
    /// Default expression as stored (e.g. `'bob'`, `0`, `NULL`), if any.
    pub default_value: Option<String>,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Whether the column carries NOT NULL.
    pub not_null: bool,
    /// Whether the column is the table's AUTOINCREMENT key.
    pub auto_increment: bool,
}

/// The live column set of a table, in introspection order.
///
/// Behaves like a map keyed by column name while preserving the engine's
/// column ordering, which the rebuild relies on.
#[derive(Debug, Clone, Default)]
pub struct LiveColumns {
    columns: Vec<ColumnInfo>,
}

impl LiveColumns {
    /// Looks a column up by name.
    pub fn get(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns `true` when a column with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in introspection order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Columns in introspection order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnInfo> {
        self.columns.iter()
    }

    /// Number of live columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when the table does not exist or has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Migration planner scoped to one table.
///
/// Obtained from [`Database::columns`](crate::Database::columns) or
/// [`TableQuery::columns`](crate::TableQuery::columns). All three
/// reconciliation operations are idempotent against an unchanged live
/// schema: re-running with the same specs issues no further statements
/// once live matches declared.
pub struct TableColumns<'conn> {
    conn: &'conn Connection,
    table: String,
}

impl<'conn> TableColumns<'conn> {
    pub(crate) fn new(conn: &'conn Connection, table: String) -> Self {
        Self { conn, table }
    }

    /// Introspects the table's live columns.
    ///
    /// Returns an empty set when the table does not exist. This is the
    /// single source of truth the add/edit/delete diffs operate against.
    pub fn get(&self) -> Result<LiveColumns> {
        let create_sql: Option<String> = self
            .conn
            .prepare("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1")?
            .query_row(params![self.table], |row| row.get(0))
            .optional()?;

        let Some(create_sql) = create_sql else {
            return Ok(LiveColumns::default());
        };
        let has_autoincrement = create_sql.to_uppercase().contains("AUTOINCREMENT");

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info('{}')", self.table))?;
        let columns = stmt
            .query_map([], |row| {
                let primary_key = row.get::<_, i64>("pk")? > 0;
                Ok(ColumnInfo {
                    name: row.get("name")?,
                    declared_type: row.get("type")?,
                    default_value: row.get("dflt_value")?,
                    primary_key,
                    not_null: row.get::<_, i64>("notnull")? != 0,
                    auto_increment: primary_key && has_autoincrement,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(LiveColumns { columns })
    }

    /// Adds every declared column missing from the live schema.
    ///
    /// Specs whose key already exists are left untouched, so the call is
    /// idempotent per key.
    pub fn add(&self, specs: &[ColumnSpec]) -> Result<()> {
        let errors = validate_column_specs(specs);
        if !errors.is_empty() {
            return Err(SqliteError::from_validation(errors));
        }

        let live = self.get()?;
        for spec in specs {
            if live.contains(&spec.key) {
                continue;
            }
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_ident(&self.table),
                column_definition(spec)
            );
            query_records(self.conn, &sql)?;
        }
        Ok(())
    }

    /// Reconciles every declared column that exists live.
    ///
    /// Columns whose declared spec matches the live record are skipped.
    /// SQLite has no in-place column alteration, so a differing type,
    /// default, or key-role triggers the data-preserving rebuild: the
    /// edited column takes its declared definition and every other live
    /// column is re-declared verbatim, in introspection order. The
    /// rename/create/copy/drop sequence runs inside one transaction.
    pub fn edit(&self, specs: &[ColumnSpec]) -> Result<()> {
        let errors = validate_column_specs(specs);
        if !errors.is_empty() {
            return Err(SqliteError::from_validation(errors));
        }

        let mut live = self.get()?;
        for spec in specs {
            let Some(current) = live.get(&spec.key) else {
                continue;
            };
            if !spec_differs(spec, current) {
                continue;
            }
            info!(
                table = %self.table,
                column = %spec.key,
                live_type = %current.declared_type,
                declared_type = %spec.full_type(),
                "live column differs from spec, rebuilding table"
            );

            let definitions: Vec<String> = live
                .iter()
                .map(|col| {
                    if col.name == spec.key {
                        column_definition(spec)
                    } else {
                        live_column_definition(col)
                    }
                })
                .collect();
            let copy_columns: Vec<String> =
                live.iter().map(|col| quote_ident(&col.name)).collect();
            self.rebuild(&definitions, &copy_columns)?;

            // The rebuild invalidates the snapshot the diff runs against.
            live = self.get()?;
        }
        Ok(())
    }

    /// Drops every listed column present in the live schema.
    ///
    /// Tries the engine's direct `DROP COLUMN` first; when the engine
    /// rejects it (older SQLite, or a keyed/indexed column), falls back to
    /// the transactional rebuild without that column. Keys not present are
    /// no-ops.
    pub fn delete<I, S>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut live = self.get()?;
        for key in keys {
            let key = key.as_ref();
            if !live.contains(key) {
                continue;
            }
            let direct = format!(
                "ALTER TABLE {} DROP COLUMN {}",
                quote_ident(&self.table),
                quote_ident(key)
            );
            match query_records(self.conn, &direct) {
                Ok(_) => {}
                Err(SqliteError::Database(err)) => {
                    warn!(
                        table = %self.table,
                        column = %key,
                        error = %err,
                        "direct DROP COLUMN rejected, rebuilding without column"
                    );
                    self.rebuild_without(&live, key)?;
                }
                Err(other) => return Err(other),
            }
            live = self.get()?;
        }
        Ok(())
    }

    fn rebuild_without(&self, live: &LiveColumns, key: &str) -> Result<()> {
        let definitions: Vec<String> = live
            .iter()
            .filter(|col| col.name != key)
            .map(live_column_definition)
            .collect();
        if definitions.is_empty() {
            return Err(SqliteError::Migration(format!(
                "cannot drop the only column '{key}' of table '{}'",
                self.table
            )));
        }
        let copy_columns: Vec<String> = live
            .iter()
            .filter(|col| col.name != key)
            .map(|col| quote_ident(&col.name))
            .collect();
        self.rebuild(&definitions, &copy_columns)
    }

    /// Runs the rename → create → copy → drop sequence in one transaction.
    ///
    /// `copy_columns` is used verbatim on both sides of the copy, so the
    /// row data of every listed column survives the rebuild.
    fn rebuild(&self, definitions: &[String], copy_columns: &[String]) -> Result<()> {
        let table = quote_ident(&self.table);
        let temp = quote_ident(&format!("{}_old", self.table));
        let columns = copy_columns.join(", ");

        let tx = self.conn.unchecked_transaction()?;
        let steps = [
            format!("ALTER TABLE {table} RENAME TO {temp}"),
            format!("CREATE TABLE {table} ({})", definitions.join(", ")),
            format!("INSERT INTO {table} ({columns}) SELECT {columns} FROM {temp}"),
            format!("DROP TABLE {temp}"),
        ];
        for step in &steps {
            query_records(&tx, step).map_err(|e| {
                SqliteError::Migration(format!("rebuild of table '{}' failed: {e}", self.table))
            })?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Re-declares a live column exactly as introspected.
fn live_column_definition(col: &ColumnInfo) -> String {
    let mut def = format!("{} {}", quote_ident(&col.name), col.declared_type);
    if let Some(default) = &col.default_value {
        def.push_str(&format!(" DEFAULT {default}"));
    }
    if col.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    if col.auto_increment {
        def.push_str(" AUTOINCREMENT");
    }
    if col.not_null && !col.primary_key {
        def.push_str(" NOT NULL");
    }
    def
}

/// Whether a declared spec differs from the live column it targets.
///
/// Live uniqueness is not comparable (`PRAGMA table_info` cannot report
/// it), so a declared `unique` participates in definition rendering only.
fn spec_differs(spec: &ColumnSpec, live: &ColumnInfo) -> bool {
    if !spec.full_type().eq_ignore_ascii_case(&live.declared_type) {
        return true;
    }
    if default_as_stored(spec) != live.default_value {
        return true;
    }
    if spec.options.primary != live.primary_key {
        return true;
    }
    if spec.options.autoincrement != live.auto_increment {
        return true;
    }
    false
}
