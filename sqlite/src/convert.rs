//! Statement execution and row conversion.
//!
//! All statements funnel through [`query_records`], which logs the rendered
//! SQL and maps result rows into [`Record`]s. Running DDL and DML through
//! the query path mirrors the single round-trip contract of the connection:
//! statements that return no rows simply yield an empty record list.

use std::collections::BTreeMap;

use fluentlite_core::{Record, Value};
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tracing::debug;

use crate::error::Result;

/// Maps one result cell into a [`Value`].
///
/// The dialect has no blob literal; blobs surface as lossy UTF-8 text.
fn cell_to_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Converts one rusqlite row into a [`Record`].
pub(crate) fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let mut record = BTreeMap::new();
    for (idx, name) in row.as_ref().column_names().iter().enumerate() {
        record.insert(name.to_string(), cell_to_value(row.get_ref(idx)?));
    }
    Ok(record)
}

/// Executes one statement and collects every returned row.
///
/// Works uniformly for SELECT, DML, DDL, and pragma statements; non-query
/// statements return an empty list. Execution errors propagate unchanged.
pub(crate) fn query_records(conn: &Connection, sql: &str) -> Result<Vec<Record>> {
    debug!(sql, "executing statement");
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| row_to_record(row))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_query_statements_return_no_rows() {
        let conn = Connection::open_in_memory().unwrap();
        let rows = query_records(&conn, "CREATE TABLE t (a INTEGER)").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn rows_map_to_records() {
        let conn = Connection::open_in_memory().unwrap();
        query_records(&conn, "CREATE TABLE t (a INTEGER, b TEXT, c REAL)").unwrap();
        query_records(&conn, "INSERT INTO t VALUES (1, 'x', 2.5)").unwrap();
        query_records(&conn, "INSERT INTO t VALUES (NULL, NULL, NULL)").unwrap();

        let rows = query_records(&conn, "SELECT * FROM t ORDER BY a").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["a"], Value::Integer(1));
        assert_eq!(rows[1]["b"], Value::Text("x".to_string()));
        assert_eq!(rows[1]["c"], Value::Real(2.5));
        assert!(rows[0]["a"].is_null());
    }

    #[test]
    fn execution_errors_propagate() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(query_records(&conn, "SELECT * FROM missing_table").is_err());
    }
}
