// crates/sqlite-gate-store/src/schema.rs
// ============================================================================
// Module: Live Schema Snapshot
// Description: Table and column discovery used for identifier validation.
// Purpose: Confirm identifiers exist before they are placed in SQL text.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Bind parameters cover values only, so table and column names must be
//! checked against the live schema before a statement is built. Snapshots are
//! queried fresh for every invocation and never cached.
//!
//! ## Invariants
//! - Name comparison is exact (byte-for-byte), not case-folded.
//! - Column lists preserve declaration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::params;

use crate::error::SqliteGateError;

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Lists every table name in the main schema.
const TABLES_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid";
/// Lists the columns of one table in declaration order.
const COLUMNS_SQL: &str = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Table names present in the database at load time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaSnapshot {
    /// Table names in creation order.
    tables: Vec<String>,
}

impl SchemaSnapshot {
    /// Reads the current table list.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteGateError::Db`] when the schema query fails.
    pub fn load(connection: &Connection) -> Result<Self, SqliteGateError> {
        let mut statement = connection.prepare(TABLES_SQL)?;
        let tables = statement
            .query_map(params![], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            tables,
        })
    }

    /// Returns true when `table` is present.
    #[must_use]
    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.iter().any(|name| name == table)
    }

    /// Reads the column names of a table known to this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteGateError::UnknownTable`] when the table is absent and
    /// [`SqliteGateError::Db`] when the column query fails.
    pub fn columns(
        &self,
        connection: &Connection,
        table: &str,
    ) -> Result<Vec<String>, SqliteGateError> {
        if !self.contains_table(table) {
            return Err(SqliteGateError::UnknownTable {
                table: table.to_string(),
            });
        }
        let mut statement = connection.prepare(COLUMNS_SQL)?;
        let columns = statement
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Quotes a validated identifier for inclusion in SQL text.
///
/// Embedded double quotes are doubled, so names with spaces or punctuation
/// keep their exact spelling.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for ch in name.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

// ============================================================================
// SECTION: Tests
// ============================================================================
