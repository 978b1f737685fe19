// crates/sqlite-gate-store/src/lib.rs
// ============================================================================
// Module: SQLite Gate Store Library
// Description: Public API surface for lock probing and validated upserts.
// Purpose: Expose connection, lock gate, schema, and upsert helpers.
// Dependencies: rusqlite, thiserror
// ============================================================================

//! ## Overview
//! `sqlite-gate-store` holds the database logic behind the `db-lock` and
//! `db-update` tools. [`probe`] classifies a database file as locked or
//! unlocked, [`LockGate`] drives the retry loop, and [`SqliteUpsertWriter`]
//! writes one field of one row after validating every identifier against the
//! live schema.
//!
//! Security posture: table and column names are untrusted until they match a
//! fresh schema snapshot; values are always bound, never interpolated.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod connection;
pub mod error;
pub mod lock;
pub mod schema;
pub mod upsert;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use connection::DEFAULT_BUSY_TIMEOUT_MS;
pub use connection::SqliteConnectionConfig;
pub use connection::open_connection;
pub use error::SqliteGateError;
pub use lock::DEFAULT_RETRY_INTERVAL;
pub use lock::GateOutcome;
pub use lock::LockGate;
pub use lock::LockState;
pub use lock::RetryPolicy;
pub use lock::Sleeper;
pub use lock::ThreadSleeper;
pub use lock::probe;
pub use schema::SchemaSnapshot;
pub use schema::quote_identifier;
pub use upsert::SqliteUpsertWriter;
pub use upsert::UpsertAction;
pub use upsert::UpsertOutcome;
pub use upsert::UpsertRequest;
