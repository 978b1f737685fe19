// crates/sqlite-gate-store/src/error.rs
// ============================================================================
// Module: SQLite Gate Errors
// Description: Error taxonomy for lock probing and upserts.
// Purpose: Separate connection, engine, and identifier validation failures.
// Dependencies: rusqlite, thiserror
// ============================================================================

//! ## Overview
//! Every fallible store operation returns [`SqliteGateError`]. Engine errors
//! are rendered to strings at this boundary so callers never depend on
//! `rusqlite` types. A lock condition is not an error; see
//! [`crate::LockState`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the lock gate and the upsert writer.
///
/// # Invariants
/// - Error messages never embed the data value being written.
/// - Validation variants are only produced before any mutation SQL runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteGateError {
    /// The engine refused to open the database file.
    #[error("could not connect to database: {0}")]
    Connect(String),
    /// `SQLite` engine error outside the lock classification.
    #[error("sqlite error: {0}")]
    Db(String),
    /// Invalid caller input (for example an empty path).
    #[error("invalid input: {0}")]
    Invalid(String),
    /// The table is absent from the live schema.
    #[error("invalid table name: {table}")]
    UnknownTable {
        /// Requested table name.
        table: String,
    },
    /// The data column is absent from the table.
    #[error("invalid column name: {column}")]
    UnknownColumn {
        /// Table that was inspected.
        table: String,
        /// Requested column name.
        column: String,
    },
    /// The index column is absent from the table.
    #[error("invalid index field name: {column}")]
    UnknownIndexColumn {
        /// Table that was inspected.
        table: String,
        /// Requested index column name.
        column: String,
    },
}

impl SqliteGateError {
    /// Returns true when the error is an identifier validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownTable { .. } | Self::UnknownColumn { .. } | Self::UnknownIndexColumn { .. }
        )
    }
}

impl From<rusqlite::Error> for SqliteGateError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}
