// crates/sqlite-gate-config/src/lib.rs
// ============================================================================
// Module: SQLite Gate Config Library
// Description: Config model and database path resolution.
// Purpose: Single source of truth for sqlite-gate.toml semantics.
// Dependencies: sqlite-gate-store, serde, toml
// ============================================================================

//! ## Overview
//! `sqlite-gate-config` loads the optional `sqlite-gate.toml` file and turns
//! CLI flags, environment values, and file settings into explicit
//! [`sqlite_gate_store::SqliteConnectionConfig`] values. Environment lookups
//! happen in the binaries; this crate only receives their results.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
