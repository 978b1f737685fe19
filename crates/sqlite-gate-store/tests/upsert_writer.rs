// crates/sqlite-gate-store/tests/upsert_writer.rs
// ============================================================================
// Module: Upsert Writer Tests
// Description: Validated update-or-insert against file-backed databases.
// Purpose: Validate round trips, identifier rejection, and value binding.
// Dependencies: sqlite-gate-store, rusqlite, tempfile, proptest
// ============================================================================

//! ## Overview
//! Exercises [`SqliteUpsertWriter`] through its public API:
//! - Insert-then-update keeps one row per index
//! - Unknown table/column/index column leave the table untouched
//! - Quoted identifiers with spaces and quotes are writable
//! - Arbitrary values are stored verbatim (bound, not interpolated)

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use proptest::prelude::*;
use rusqlite::Connection;
use rusqlite::params;
use sqlite_gate_store::SqliteConnectionConfig;
use sqlite_gate_store::SqliteGateError;
use sqlite_gate_store::SqliteUpsertWriter;
use sqlite_gate_store::UpsertAction;
use sqlite_gate_store::UpsertOutcome;
use sqlite_gate_store::UpsertRequest;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn users_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("users.db");
    let connection = Connection::open(&path).expect("open db");
    connection
        .execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO users (id, name) VALUES (1, 'Alice');",
        )
        .expect("seed users");
    path
}

fn users_request(index_value: &str, data: &str) -> UpsertRequest {
    UpsertRequest {
        table: "users".to_string(),
        index_column: "id".to_string(),
        index_value: index_value.to_string(),
        data_column: "name".to_string(),
        data: data.to_string(),
    }
}

fn open_writer(path: &Path) -> SqliteUpsertWriter {
    SqliteUpsertWriter::open(&SqliteConnectionConfig::new(path)).expect("open writer")
}

fn row_count(path: &Path, table: &str) -> i64 {
    let connection = Connection::open(path).expect("open db");
    connection
        .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
        .expect("count rows")
}

fn name_for(path: &Path, id: i64) -> Option<String> {
    let connection = Connection::open(path).expect("open db");
    connection
        .query_row("SELECT name FROM users WHERE id = ?1", params![id], |row| row.get(0))
        .ok()
}

// ============================================================================
// SECTION: Round Trip
// ============================================================================

#[test]
fn existing_row_is_updated_in_place() {
    let dir = TempDir::new().expect("tempdir");
    let path = users_db(&dir);
    let outcome = open_writer(&path).upsert(&users_request("1", "Bob")).expect("upsert");
    assert_eq!(
        outcome,
        UpsertOutcome::Applied {
            action: UpsertAction::Update
        }
    );
    assert_eq!(name_for(&path, 1).as_deref(), Some("Bob"));
    assert_eq!(row_count(&path, "users"), 1);
}

#[test]
fn new_index_inserts_then_updates_same_row() {
    let dir = TempDir::new().expect("tempdir");
    let path = users_db(&dir);
    let first = open_writer(&path).upsert(&users_request("2", "Carol")).expect("insert");
    assert_eq!(first.action(), UpsertAction::Insert);
    assert_eq!(row_count(&path, "users"), 2);
    assert_eq!(name_for(&path, 2).as_deref(), Some("Carol"));

    let second = open_writer(&path).upsert(&users_request("2", "Dana")).expect("update");
    assert_eq!(second.action(), UpsertAction::Update);
    assert_eq!(row_count(&path, "users"), 2);
    assert_eq!(name_for(&path, 2).as_deref(), Some("Dana"));
}

#[test]
fn identifiers_with_spaces_and_quotes_are_writable() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("odd.db");
    let connection = Connection::open(&path).expect("open db");
    connection
        .execute_batch("CREATE TABLE \"order items\" (\"item id\" TEXT, \"say \"\"hi\"\"\" TEXT);")
        .expect("create table");
    drop(connection);
    let request = UpsertRequest {
        table: "order items".to_string(),
        index_column: "item id".to_string(),
        index_value: "sku-1".to_string(),
        data_column: "say \"hi\"".to_string(),
        data: "hello".to_string(),
    };
    let outcome = open_writer(&path).upsert(&request).expect("upsert");
    assert!(outcome.is_applied());
    assert_eq!(row_count(&path, "order items"), 1);
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn unknown_table_is_rejected_without_mutation() {
    let dir = TempDir::new().expect("tempdir");
    let path = users_db(&dir);
    let mut request = users_request("9", "Eve");
    request.table = "customers".to_string();
    let err = open_writer(&path).upsert(&request).expect_err("unknown table");
    assert_eq!(
        err,
        SqliteGateError::UnknownTable {
            table: "customers".to_string()
        }
    );
    assert!(err.is_validation());
    assert_eq!(row_count(&path, "users"), 1);
}

#[test]
fn unknown_field_is_rejected_without_mutation() {
    let dir = TempDir::new().expect("tempdir");
    let path = users_db(&dir);
    let mut request = users_request("1", "Eve");
    request.data_column = "email".to_string();
    let err = open_writer(&path).upsert(&request).expect_err("unknown column");
    assert!(matches!(err, SqliteGateError::UnknownColumn { ref column, .. } if column == "email"));
    assert_eq!(name_for(&path, 1).as_deref(), Some("Alice"));
}

#[test]
fn unknown_index_field_is_rejected_without_mutation() {
    let dir = TempDir::new().expect("tempdir");
    let path = users_db(&dir);
    let mut request = users_request("7", "Eve");
    request.index_column = "uid".to_string();
    let err = open_writer(&path).upsert(&request).expect_err("unknown index column");
    assert!(matches!(err, SqliteGateError::UnknownIndexColumn { ref column, .. } if column == "uid"));
    assert_eq!(row_count(&path, "users"), 1);
}

#[test]
fn validation_uses_exact_name_match() {
    let dir = TempDir::new().expect("tempdir");
    let path = users_db(&dir);
    let mut request = users_request("1", "Eve");
    request.table = "Users".to_string();
    let err = open_writer(&path).upsert(&request).expect_err("case mismatch");
    assert!(err.is_validation());
}

// ============================================================================
// SECTION: Value Binding
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn arbitrary_values_are_stored_verbatim(data in "\\PC{0,64}", index in "[a-z0-9' ;-]{1,12}") {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("kv.db");
        let connection = Connection::open(&path).expect("open db");
        connection
            .execute_batch("CREATE TABLE kv (k TEXT, v TEXT);")
            .expect("create table");
        let request = UpsertRequest {
            table: "kv".to_string(),
            index_column: "k".to_string(),
            index_value: index.clone(),
            data_column: "v".to_string(),
            data: data.clone(),
        };
        let outcome = open_writer(&path).upsert(&request).expect("upsert");
        prop_assert!(outcome.is_applied());
        let stored: String = connection
            .query_row("SELECT v FROM kv WHERE k = ?1", params![index], |row| row.get(0))
            .expect("read value");
        prop_assert_eq!(stored, data);
    }
}
