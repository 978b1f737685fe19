// crates/sqlite-gate-store/src/upsert.rs
// ============================================================================
// Module: Validated Upsert Writer
// Description: Update-or-insert of one field in one row.
// Purpose: Mutate a single target cell after validating every identifier.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! [`SqliteUpsertWriter::upsert`] validates the table, data column, and index
//! column against a fresh [`SchemaSnapshot`], checks whether a row with the
//! index value exists, and issues an UPDATE or an INSERT in its own
//! transaction.
//!
//! ## Invariants
//! - Validation failures return `Err` before any mutation SQL is built.
//! - Execution and commit failures are reported as
//!   [`UpsertOutcome::Failed`], not as `Err`; callers decide how loud to be.
//! - The existence check and the mutation are separate statements; a
//!   concurrent writer can change the answer in between.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::connection::SqliteConnectionConfig;
use crate::connection::open_connection;
use crate::error::SqliteGateError;
use crate::schema::SchemaSnapshot;
use crate::schema::quote_identifier;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One upsert of one field in one row.
///
/// # Invariants
/// - `index_value` and `data` are always bound, never interpolated.
/// - `table`, `index_column`, and `data_column` must exist in the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRequest {
    /// Target table name.
    pub table: String,
    /// Column used to locate the row.
    pub index_column: String,
    /// Value of `index_column` identifying the row.
    pub index_value: String,
    /// Column receiving `data`.
    pub data_column: String,
    /// Value to write.
    pub data: String,
}

/// Statement chosen after the existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    /// A matching row existed and was updated in place.
    Update,
    /// No matching row existed and a new one was inserted.
    Insert,
}

/// Result of an upsert that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The statement executed and committed.
    Applied {
        /// Statement that ran.
        action: UpsertAction,
    },
    /// The statement or its commit failed.
    Failed {
        /// Statement that was attempted.
        action: UpsertAction,
        /// Engine error message.
        message: String,
    },
}

impl UpsertOutcome {
    /// Returns the statement chosen for this outcome.
    #[must_use]
    pub const fn action(&self) -> UpsertAction {
        match self {
            Self::Applied {
                action,
            }
            | Self::Failed {
                action, ..
            } => *action,
        }
    }

    /// Returns true when the write committed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Upsert writer bound to one short-lived connection.
#[derive(Debug)]
pub struct SqliteUpsertWriter {
    /// Connection owned for the lifetime of the writer.
    connection: Connection,
}

impl SqliteUpsertWriter {
    /// Opens the database named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteGateError`] when the database cannot be opened.
    pub fn open(config: &SqliteConnectionConfig) -> Result<Self, SqliteGateError> {
        Ok(Self::from_connection(open_connection(config)?))
    }

    /// Wraps an already-open connection.
    #[must_use]
    pub const fn from_connection(connection: Connection) -> Self {
        Self {
            connection,
        }
    }

    /// Checks the table, then the data column, then the index column.
    ///
    /// # Errors
    ///
    /// Returns the first failing validation variant of [`SqliteGateError`],
    /// or [`SqliteGateError::Db`] when the schema cannot be read.
    pub fn validate(&self, request: &UpsertRequest) -> Result<(), SqliteGateError> {
        let snapshot = SchemaSnapshot::load(&self.connection)?;
        let columns = snapshot.columns(&self.connection, &request.table)?;
        if !columns.iter().any(|column| column == &request.data_column) {
            return Err(SqliteGateError::UnknownColumn {
                table: request.table.clone(),
                column: request.data_column.clone(),
            });
        }
        if !columns.iter().any(|column| column == &request.index_column) {
            return Err(SqliteGateError::UnknownIndexColumn {
                table: request.table.clone(),
                column: request.index_column.clone(),
            });
        }
        Ok(())
    }

    /// Validates the request and writes the field.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteGateError`] for validation failures and for a failed
    /// existence check. Failures of the UPDATE/INSERT itself are returned as
    /// [`UpsertOutcome::Failed`].
    pub fn upsert(&mut self, request: &UpsertRequest) -> Result<UpsertOutcome, SqliteGateError> {
        self.validate(request)?;
        let table = quote_identifier(&request.table);
        let index_column = quote_identifier(&request.index_column);
        let data_column = quote_identifier(&request.data_column);

        let action = if self.row_exists(&table, &index_column, &request.index_value)? {
            UpsertAction::Update
        } else {
            UpsertAction::Insert
        };
        let result = match action {
            UpsertAction::Update => self.execute_committed(
                &format!("UPDATE {table} SET {data_column} = ?1 WHERE {index_column} = ?2"),
                params![request.data, request.index_value],
            ),
            UpsertAction::Insert => self.execute_committed(
                &format!("INSERT INTO {table} ({index_column}, {data_column}) VALUES (?1, ?2)"),
                params![request.index_value, request.data],
            ),
        };
        Ok(match result {
            Ok(()) => UpsertOutcome::Applied {
                action,
            },
            Err(err) => UpsertOutcome::Failed {
                action,
                message: err.to_string(),
            },
        })
    }

    /// Returns true when any row has `index_column = index_value`.
    fn row_exists(
        &self,
        table: &str,
        index_column: &str,
        index_value: &str,
    ) -> Result<bool, SqliteGateError> {
        let sql = format!("SELECT 1 FROM {table} WHERE {index_column} = ?1 LIMIT 1");
        let found = self
            .connection
            .query_row(&sql, params![index_value], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Runs one statement in a transaction and commits it.
    fn execute_committed<P: rusqlite::Params>(
        &mut self,
        sql: &str,
        params: P,
    ) -> rusqlite::Result<()> {
        let tx = self.connection.transaction()?;
        tx.execute(sql, params)?;
        tx.commit()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
