// crates/sqlite-gate-cli/tests/db_lock_command.rs
// ============================================================================
// Module: db-lock Command Tests
// Description: Drive the db-lock binary against real SQLite files.
// Purpose: Pin exit codes, lock reporting, retry, and script replay.
// Dependencies: sqlite-gate-cli binaries, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Each test seeds a database in a temp directory, optionally holds an
//! exclusive transaction on it from the test process, and runs `db-lock`.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;
use std::thread;
use std::time::Duration;

use rusqlite::Connection;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Creates a database with one table.
fn seeded_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("gate.db");
    let connection = Connection::open(&path).expect("open db");
    connection
        .execute_batch("CREATE TABLE jobs (id INTEGER PRIMARY KEY, state TEXT);")
        .expect("create table");
    path
}

/// Opens a connection holding an exclusive write transaction.
fn hold_exclusive(path: &Path) -> Connection {
    let connection = Connection::open(path).expect("open holder");
    connection
        .execute_batch("BEGIN EXCLUSIVE; INSERT INTO jobs (state) VALUES ('running');")
        .expect("take exclusive lock");
    connection
}

/// Builds a `db-lock` command with a clean environment and no busy wait.
///
/// Gate `flags` are placed before the database path.
fn db_lock_with(db: &Path, flags: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_db-lock"));
    command
        .env_remove("SQLITE_GATE_CONFIG")
        .env_remove("SQLITE_GATE_LANG")
        .args(["--busy-timeout-ms", "0"])
        .args(flags);
    command.arg(db);
    command
}

/// Builds a `db-lock` command with default gate flags.
fn db_lock(db: &Path) -> Command {
    db_lock_with(db, &[])
}

/// Runs a command to completion.
fn run(command: &mut Command) -> Output {
    command.output().expect("run db-lock")
}

/// Returns stdout as text.
fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Returns stderr as text.
fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// SECTION: Lock Reporting
// ============================================================================

#[test]
fn unlocked_database_without_script_exits_zero() {
    let dir = TempDir::new().expect("temp dir");
    let db = seeded_db(&dir);
    let output = run(&mut db_lock(&db));
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}

#[cfg(unix)]
#[test]
fn locked_database_without_retry_exits_one_and_skips_script() {
    let dir = TempDir::new().expect("temp dir");
    let db = seeded_db(&dir);
    let marker = dir.path().join("ran");
    let _holder = hold_exclusive(&db);
    let output = run(db_lock(&db).arg("touch").arg(&marker));
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "Database locked\n");
    assert!(!marker.exists(), "script must not run while locked");
}

#[test]
fn locked_database_reports_in_catalan() {
    let dir = TempDir::new().expect("temp dir");
    let db = seeded_db(&dir);
    let _holder = hold_exclusive(&db);
    let output = run(db_lock(&db).env("SQLITE_GATE_LANG", "ca"));
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "Base de dades bloquejada\n");
    assert!(stderr(&output).contains("traduïda automàticament"));
}

#[cfg(unix)]
#[test]
fn retry_waits_for_release_then_runs_script() {
    let dir = TempDir::new().expect("temp dir");
    let db = seeded_db(&dir);
    let marker = dir.path().join("ran");
    let holder = hold_exclusive(&db);
    let child = db_lock_with(&db, &["--retry", "--retry-interval-secs", "1"])
        .arg("touch")
        .arg(&marker)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn db-lock");
    thread::sleep(Duration::from_millis(300));
    holder.execute_batch("ROLLBACK;").expect("release lock");
    drop(holder);
    let output = child.wait_with_output().expect("wait db-lock");
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("retrying in 1s"));
    assert!(marker.exists(), "script runs after the lock clears");
}

#[test]
fn retry_flag_after_database_path_is_a_gate_flag() {
    for flag in ["--retry", "-r"] {
        let dir = TempDir::new().expect("temp dir");
        let db = seeded_db(&dir);
        let config = dir.path().join("sqlite-gate.toml");
        fs::write(&config, "[lock_gate]\nretry_interval_secs = 1\n").expect("write config");
        let holder = hold_exclusive(&db);
        let child = db_lock(&db)
            .arg(flag)
            .env("SQLITE_GATE_CONFIG", &config)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn db-lock");
        thread::sleep(Duration::from_millis(300));
        holder.execute_batch("ROLLBACK;").expect("release lock");
        drop(holder);
        let output = child.wait_with_output().expect("wait db-lock");
        let errors = stderr(&output);
        assert_eq!(output.status.code(), Some(0), "{flag} stderr: {errors}");
        assert!(errors.contains("retrying in 1s"), "{flag} must enable retry: {errors}");
        assert!(!errors.contains("Failed to run"), "{flag} must not be run as a script");
        assert_eq!(stdout(&output), "");
    }
}

#[test]
fn corrupt_database_is_a_fatal_probe_error() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("garbage.db");
    fs::write(&db, vec![0x5a_u8; 4096]).expect("write garbage");
    let output = run(&mut db_lock(&db));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to check database lock"));
}

// ============================================================================
// SECTION: Script Execution
// ============================================================================

#[cfg(unix)]
#[test]
fn script_output_is_replayed_and_its_status_ignored() {
    let dir = TempDir::new().expect("temp dir");
    let db = seeded_db(&dir);
    let output = run(db_lock(&db).args(["sh", "-c", "echo out; echo err >&2; exit 3"]));
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "out\n\nerr\n\n");
}

#[cfg(unix)]
#[test]
fn script_arguments_pass_through_verbatim() {
    let dir = TempDir::new().expect("temp dir");
    let db = seeded_db(&dir);
    let output =
        run(db_lock(&db).args(["sh", "-c", "printf '%s|' \"$@\"", "sh", "-r", "--retry"]));
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "-r|--retry|\n");
}

#[test]
fn missing_script_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let db = seeded_db(&dir);
    let output = run(db_lock(&db).arg(dir.path().join("no-such-program")));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to run"));
}
