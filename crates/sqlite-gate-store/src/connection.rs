// crates/sqlite-gate-store/src/connection.rs
// ============================================================================
// Module: SQLite Connections
// Description: Connection configuration and opening for a single database file.
// Purpose: Give both tools one way to open a short-lived, exclusive handle.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Each tool invocation opens exactly one connection and drops it at exit.
//! The path and busy timeout travel in an explicit
//! [`SqliteConnectionConfig`] rather than being read from the environment
//! here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;

use crate::error::SqliteGateError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms), matching the conventional `SQLite` client default.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Connection settings for one database file.
///
/// # Invariants
/// - `path` must be non-empty.
/// - `busy_timeout_ms` is interpreted as milliseconds; zero fails fast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConnectionConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl SqliteConnectionConfig {
    /// Builds a config for `path` with the default busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Returns a copy with the busy timeout replaced.
    #[must_use]
    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }
}

// ============================================================================
// SECTION: Open
// ============================================================================

/// Opens a read-write connection, creating the file when absent.
///
/// # Errors
///
/// Returns [`SqliteGateError::Invalid`] for an unusable path and
/// [`SqliteGateError::Connect`] when the engine refuses to open the file.
pub fn open_connection(config: &SqliteConnectionConfig) -> Result<Connection, SqliteGateError> {
    validate_path(&config.path)?;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteGateError::Connect(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteGateError::Connect(err.to_string()))?;
    Ok(connection)
}

/// Validates database paths for basic safety limits.
fn validate_path(path: &Path) -> Result<(), SqliteGateError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteGateError::Invalid("database path must not be empty".to_string()));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteGateError::Invalid("database path exceeds length limit".to_string()));
    }
    if path.is_dir() {
        return Err(SqliteGateError::Connect(format!(
            "{} is a directory, not a database file",
            path.display()
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::expect_used, reason = "Test-only assertions are permitted.")]
mod tests {
    use super::SqliteConnectionConfig;
    use super::SqliteGateError;
    use super::open_connection;

    #[test]
    fn empty_path_is_rejected_before_open() {
        let result = open_connection(&SqliteConnectionConfig::new(""));
        assert!(matches!(result, Err(SqliteGateError::Invalid(_))));
    }

    #[test]
    fn directory_path_is_a_connection_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = open_connection(&SqliteConnectionConfig::new(dir.path()));
        assert!(matches!(result, Err(SqliteGateError::Connect(_))));
    }
}
