// crates/sqlite-gate-cli/src/lib.rs
// ============================================================================
// Module: SQLite Gate CLI Library
// Description: Shared helpers for the db-lock and db-update binaries.
// Purpose: Localized messages, output plumbing, write logs, and child runs.
// Dependencies: clap, sqlite-gate-config, sqlite-gate-store, thiserror, time
// ============================================================================

//! ## Overview
//! Both binaries route every user-facing string through the [`t!`] catalog
//! and write through the helpers in [`output`]. [`write_log`] appends upsert
//! records to a text log and [`subprocess`] runs the command `db-lock` gates.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
pub mod output;
pub mod subprocess;
pub mod write_log;

#[cfg(test)]
#[path = "tests/i18n.rs"]
mod i18n_tests;
#[cfg(test)]
#[path = "tests/write_log.rs"]
mod write_log_tests;
