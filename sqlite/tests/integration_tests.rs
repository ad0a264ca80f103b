//! Integration tests for the fluentlite-sqlite crate.

use fluentlite_core::{ColumnSpec, Comparison, OrderDirection, Record, Value};
use fluentlite_sqlite::{Database, SqliteError};

/// Builds a record from literal pairs.
fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Creates a `users` table with an autoincrement key and seed columns.
fn users_table(db: &Database) {
    db.table("users")
        .create(&[
            ColumnSpec::new("id", "INTEGER").primary().autoincrement(),
            ColumnSpec::new("name", "VARCHAR").with_length(120),
            ColumnSpec::new("age", "INTEGER").with_default(0),
            ColumnSpec::new("vip", "INTEGER").with_default(0),
        ])
        .unwrap();
}

fn seed_users(db: &Database) {
    db.table("users")
        .insert(&[
            record(&[("name", Value::from("ada")), ("age", Value::from(36)), ("vip", Value::from(1))]),
            record(&[("name", Value::from("bob")), ("age", Value::from(17)), ("vip", Value::from(0))]),
            record(&[("name", Value::from("cyn")), ("age", Value::from(25)), ("vip", Value::from(0))]),
            record(&[("name", Value::from("dee")), ("age", Value::from(62)), ("vip", Value::from(1))]),
        ])
        .unwrap();
}

/// The stored CREATE statement of a table, for asserting "no statements ran".
fn stored_sql(db: &Database, table: &str) -> String {
    db.connection()
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .unwrap()
}

#[test]
fn create_then_columns_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);

    let live = db.columns("users").get().unwrap();
    let names: Vec<&str> = live.names().collect();
    assert_eq!(names, vec!["id", "name", "age", "vip"]);
    assert!(live.get("id").unwrap().primary_key);
    assert!(live.get("id").unwrap().auto_increment);
    assert_eq!(live.get("name").unwrap().declared_type, "VARCHAR(120)");
    assert_eq!(live.get("age").unwrap().default_value.as_deref(), Some("0"));
}

#[test]
fn insert_refetches_each_row_independently() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);

    let inserted = db
        .table("users")
        .insert(&[
            record(&[("name", Value::from("ada")), ("age", Value::from(36))]),
            record(&[("name", Value::from("bob")), ("age", Value::from(17))]),
        ])
        .unwrap();

    assert_eq!(inserted.len(), 2);
    assert_eq!(inserted[0]["id"], Value::Integer(1));
    assert_eq!(inserted[0]["name"], Value::Text("ada".to_string()));
    assert_eq!(inserted[1]["id"], Value::Integer(2));
    assert_eq!(inserted[1]["name"], Value::Text("bob".to_string()));
    // Defaults applied by the engine come back on the re-fetch.
    assert_eq!(inserted[0]["vip"], Value::Integer(0));
}

#[test]
fn insert_rejects_malformed_batch_before_any_statement() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);

    let err = db
        .table("users")
        .insert(&[record(&[("name", Value::from("ada"))]), Record::new()])
        .unwrap_err();
    assert!(matches!(err, SqliteError::InvalidInput(_)));

    // The well-formed first row must not have been inserted either.
    assert!(db.table("users").get().unwrap().is_empty());
}

#[test]
fn where_chain_filters_rows() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    seed_users(&db);

    let rows = db
        .table("users")
        .where_("age", Comparison::Gt, 18)
        .or_where("vip", Comparison::Eq, 1)
        .get()
        .unwrap();
    // ada (36), cyn (25), dee (62) match age; bob is vip=0 and 17.
    assert_eq!(rows.len(), 3);
}

#[test]
fn where_group_scopes_or_branches() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    seed_users(&db);

    // vip AND (age < 30 OR age > 60) → dee only.
    let rows = db
        .table("users")
        .where_("vip", Comparison::Eq, 1)
        .where_group(|g| {
            g.push_compare("age", Comparison::Lt, 30);
            g.or();
            g.push_compare("age", Comparison::Gt, 60);
        })
        .get()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], Value::Text("dee".to_string()));
}

#[test]
fn pagination_returns_the_requested_window() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    seed_users(&db);

    let rows = db
        .table("users")
        .order_by("id", OrderDirection::Asc)
        .limit(2)
        .page(2)
        .get()
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], Value::Integer(3));
    assert_eq!(rows[1]["id"], Value::Integer(4));
}

#[test]
fn count_executes_with_order_by_suppressed() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    seed_users(&db);

    let row = db
        .table("users")
        .order_by("name", OrderDirection::Desc)
        .count()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(row["count"], Value::Integer(4));
}

#[test]
fn first_returns_none_on_empty_result() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);

    assert!(db.table("users").first().unwrap().is_none());
}

#[test]
fn find_looks_up_by_id() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    seed_users(&db);

    let row = db.table("users").find(2).unwrap().unwrap();
    assert_eq!(row["name"], Value::Text("bob".to_string()));

    let row = db.table("users").find_by("name", "cyn").unwrap().unwrap();
    assert_eq!(row["id"], Value::Integer(3));

    assert!(db.table("users").find(99).unwrap().is_none());
}

#[test]
fn update_touches_only_matching_rows() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    seed_users(&db);

    let changed = db
        .table("users")
        .where_("vip", Comparison::Eq, 1)
        .update(&record(&[("age", Value::from(99))]))
        .unwrap();
    assert_eq!(changed, 2);

    let untouched = db.table("users").find_by("name", "bob").unwrap().unwrap();
    assert_eq!(untouched["age"], Value::Integer(17));
}

#[test]
fn delete_requires_conditions_and_reports_count() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    seed_users(&db);

    assert!(matches!(
        db.table("users").delete(),
        Err(SqliteError::MissingWhereClause { .. })
    ));

    let removed = db
        .table("users")
        .where_("age", Comparison::Lt, 30)
        .delete()
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(db.table("users").get().unwrap().len(), 2);
}

#[test]
fn add_issues_only_missing_columns() {
    let db = Database::open_in_memory().unwrap();
    db.table("t")
        .create(&[
            ColumnSpec::new("a", "INTEGER"),
            ColumnSpec::new("b", "TEXT"),
        ])
        .unwrap();

    db.columns("t")
        .add(&[
            ColumnSpec::new("a", "INTEGER"),
            ColumnSpec::new("b", "TEXT"),
            ColumnSpec::new("c", "INTEGER").with_default(7),
        ])
        .unwrap();

    let live = db.columns("t").get().unwrap();
    let names: Vec<&str> = live.names().collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(live.get("c").unwrap().default_value.as_deref(), Some("7"));

    // Re-running with the same specs is a no-op.
    let before = stored_sql(&db, "t");
    db.columns("t")
        .add(&[ColumnSpec::new("c", "INTEGER").with_default(7)])
        .unwrap();
    assert_eq!(stored_sql(&db, "t"), before);
}

#[test]
fn edit_type_change_rebuilds_and_preserves_unrelated_columns() {
    let db = Database::open_in_memory().unwrap();
    db.table("t")
        .create(&[
            ColumnSpec::new("id", "INTEGER").primary().autoincrement(),
            ColumnSpec::new("a", "INTEGER"),
            ColumnSpec::new("name", "VARCHAR").with_length(40).with_default("anon"),
        ])
        .unwrap();
    db.table("t")
        .insert(&[
            record(&[("a", Value::from(1)), ("name", Value::from("x"))]),
            record(&[("a", Value::from(2)), ("name", Value::from("y"))]),
        ])
        .unwrap();

    db.columns("t").edit(&[ColumnSpec::new("a", "TEXT")]).unwrap();

    let live = db.columns("t").get().unwrap();
    // The edited column has its new type; everything else is verbatim.
    assert_eq!(live.get("a").unwrap().declared_type, "TEXT");
    assert!(live.get("id").unwrap().primary_key);
    assert!(live.get("id").unwrap().auto_increment);
    assert_eq!(live.get("name").unwrap().declared_type, "VARCHAR(40)");
    assert_eq!(live.get("name").unwrap().default_value.as_deref(), Some("'anon'"));

    // Row data survived the rebuild, including ids.
    let rows = db.table("t").order_by("id", OrderDirection::Asc).get().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], Value::Integer(1));
    assert_eq!(rows[0]["a"], Value::Text("1".to_string()));
    assert_eq!(rows[1]["name"], Value::Text("y".to_string()));
}

#[test]
fn edit_with_matching_specs_issues_no_statements() {
    let db = Database::open_in_memory().unwrap();
    db.table("t")
        .create(&[
            ColumnSpec::new("id", "INTEGER").primary().autoincrement(),
            ColumnSpec::new("name", "VARCHAR").with_length(40).with_default("anon"),
        ])
        .unwrap();

    let before = stored_sql(&db, "t");
    db.columns("t")
        .edit(&[
            ColumnSpec::new("id", "INTEGER").primary().autoincrement(),
            ColumnSpec::new("name", "VARCHAR").with_length(40).with_default("anon"),
        ])
        .unwrap();
    assert_eq!(stored_sql(&db, "t"), before);
}

#[test]
fn edit_is_idempotent_after_reconciliation() {
    let db = Database::open_in_memory().unwrap();
    db.table("t")
        .create(&[ColumnSpec::new("a", "INTEGER"), ColumnSpec::new("b", "TEXT")])
        .unwrap();

    let spec = [ColumnSpec::new("a", "TEXT").with_default("none")];
    db.columns("t").edit(&spec).unwrap();
    let after_first = stored_sql(&db, "t");

    db.columns("t").edit(&spec).unwrap();
    assert_eq!(stored_sql(&db, "t"), after_first);
}

#[test]
fn failed_rebuild_rolls_back_to_the_original_table() {
    let db = Database::open_in_memory().unwrap();
    db.table("t")
        .create(&[
            ColumnSpec::new("id", "INTEGER").primary(),
            ColumnSpec::new("a", "INTEGER"),
        ])
        .unwrap();
    db.table("t")
        .insert(&[record(&[("id", Value::from(1)), ("a", Value::from(10))])])
        .unwrap();

    // A second primary key makes the CREATE step fail mid-sequence.
    let err = db
        .columns("t")
        .edit(&[ColumnSpec::new("a", "TEXT").primary()])
        .unwrap_err();
    assert!(matches!(err, SqliteError::Migration(_)));

    // The original table is back under its own name, data intact.
    let live = db.columns("t").get().unwrap();
    assert_eq!(live.get("a").unwrap().declared_type, "INTEGER");
    let rows = db.table("t").get().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["a"], Value::Integer(10));
}

#[test]
fn delete_falls_back_to_rebuild_for_keyed_columns() {
    let db = Database::open_in_memory().unwrap();
    db.table("t")
        .create(&[
            ColumnSpec::new("id", "INTEGER").primary(),
            ColumnSpec::new("a", "INTEGER"),
            ColumnSpec::new("b", "TEXT"),
        ])
        .unwrap();
    db.table("t")
        .insert(&[record(&[
            ("id", Value::from(1)),
            ("a", Value::from(10)),
            ("b", Value::from("keep")),
        ])])
        .unwrap();

    // Dropping the primary-key column is rejected by the engine's direct
    // DROP COLUMN, exercising the rebuild fallback.
    db.columns("t").delete(["id"]).unwrap();

    let live = db.columns("t").get().unwrap();
    let names: Vec<&str> = live.names().collect();
    assert_eq!(names, vec!["a", "b"]);
    let rows = db.table("t").get().unwrap();
    assert_eq!(rows[0]["b"], Value::Text("keep".to_string()));

    // Unknown keys are no-ops.
    db.columns("t").delete(["ghost"]).unwrap();
}

#[test]
fn delete_drops_plain_columns() {
    let db = Database::open_in_memory().unwrap();
    db.table("t")
        .create(&[ColumnSpec::new("a", "INTEGER"), ColumnSpec::new("b", "TEXT")])
        .unwrap();

    db.columns("t").delete(["b"]).unwrap();
    let live = db.columns("t").get().unwrap();
    let names: Vec<&str> = live.names().collect();
    assert_eq!(names, vec!["a"]);
}

#[test]
fn drop_table_removes_the_table() {
    let db = Database::open_in_memory().unwrap();
    users_table(&db);
    db.table("users").drop_table().unwrap();
    assert!(db.columns("users").get().unwrap().is_empty());
}

#[test]
fn open_env_appends_db_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("envdb");
    unsafe {
        std::env::set_var(fluentlite_sqlite::DATABASE_ENV, base.to_str().unwrap());
    }

    let db = Database::open_env().unwrap();
    db.table("t").create(&[ColumnSpec::new("a", "INTEGER")]).unwrap();
    db.close().unwrap();

    assert!(dir.path().join("envdb.db").exists());
    unsafe {
        std::env::remove_var(fluentlite_sqlite::DATABASE_ENV);
    }
}
