//! Integration tests for the fluentlite binary.

use std::path::PathBuf;
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_fluentlite")
}

fn db_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("test.db")
}

fn exec_script(db: &PathBuf, script: &str) -> std::process::Output {
    let script_path = db.with_file_name("script.sql");
    std::fs::write(&script_path, script).unwrap();
    Command::new(bin())
        .args(["--database", db.to_str().unwrap(), "exec", "--file"])
        .arg(&script_path)
        .output()
        .expect("failed to run fluentlite")
}

#[test]
fn exec_then_tables_lists_created_table() {
    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);

    let out = exec_script(&db, "CREATE TABLE users (id INTEGER); CREATE TABLE logs (msg TEXT);");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let out = Command::new(bin())
        .args(["--database", db.to_str().unwrap(), "tables"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("users"));
    assert!(stdout.contains("logs"));
}

#[test]
fn columns_prints_live_schema_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);
    exec_script(
        &db,
        "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, name VARCHAR(40) DEFAULT 'anon');",
    );

    let out = Command::new(bin())
        .args(["--database", db.to_str().unwrap(), "columns", "t"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["id"]["primary_key"], serde_json::Value::Bool(true));
    assert_eq!(json["id"]["auto_increment"], serde_json::Value::Bool(true));
    assert_eq!(json["name"]["declared_type"], "VARCHAR(40)");
    assert_eq!(json["name"]["default_value"], "'anon'");
}

#[test]
fn drop_removes_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);
    exec_script(&db, "CREATE TABLE gone (a INTEGER);");

    let out = Command::new(bin())
        .args(["--database", db.to_str().unwrap(), "drop", "gone"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let out = Command::new(bin())
        .args(["--database", db.to_str().unwrap(), "tables"])
        .output()
        .unwrap();
    assert!(!String::from_utf8_lossy(&out.stdout).contains("gone"));
}

#[test]
fn failing_script_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);

    let out = exec_script(&db, "INSERT INTO missing VALUES (1);");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("error"));
}
