// crates/sqlite-gate-store/src/lock.rs
// ============================================================================
// Module: SQLite Lock Gate
// Description: Lock probing and the retry loop that gates subordinate work.
// Purpose: Classify a database as locked or unlocked without mutating it.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! [`probe`] opens a connection and steps `PRAGMA quick_check`. Completion
//! means the file is readable right now; a busy/locked engine failure means
//! another connection holds an exclusive lock. Every other failure is fatal
//! and is never reported as "locked".
//!
//! [`LockGate`] repeats the probe under a [`RetryPolicy`]. The loop has three
//! states (unknown, locked, unlocked) and only re-probing moves between them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use rusqlite::Connection;
use rusqlite::ErrorCode;

use crate::connection::SqliteConnectionConfig;
use crate::connection::open_connection;
use crate::error::SqliteGateError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default delay between probes when retrying.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(30);
/// Engine message reported for a lock condition.
const LOCKED_MESSAGE: &str = "database is locked";
/// Read-only consistency probe.
const PROBE_SQL: &str = "PRAGMA quick_check";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Lock classification at the moment of probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Another connection prevents the probe from proceeding.
    Locked,
    /// The probe completed.
    Unlocked,
}

/// What the gate does when a probe reports [`LockState::Locked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Give up on the first locked probe.
    Disabled,
    /// Sleep for the interval and probe again, indefinitely.
    Every(Duration),
}

/// Terminal result of [`LockGate::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The database was unlocked after `probes` attempts.
    Unlocked {
        /// Number of probes issued, including the successful one.
        probes: u64,
    },
    /// The database was locked and retry was disabled.
    Locked,
}

/// Blocking delay used between probes.
pub trait Sleeper {
    /// Blocks the caller for `duration`.
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Probes the database once and classifies its lock state.
///
/// # Errors
///
/// Returns [`SqliteGateError`] when the file cannot be opened or the probe
/// fails for any reason other than a lock condition.
pub fn probe(config: &SqliteConnectionConfig) -> Result<LockState, SqliteGateError> {
    let connection = open_connection(config)?;
    match run_quick_check(&connection) {
        Ok(()) => Ok(LockState::Unlocked),
        Err(err) if is_lock_error(&err) => Ok(LockState::Locked),
        Err(err) => Err(SqliteGateError::Db(err.to_string())),
    }
}

/// Prepares and steps the consistency probe once.
fn run_quick_check(connection: &Connection) -> rusqlite::Result<()> {
    let mut statement = connection.prepare(PROBE_SQL)?;
    let mut rows = statement.query([])?;
    rows.next()?;
    Ok(())
}

/// Returns true when an engine error reports a lock condition.
fn is_lock_error(error: &rusqlite::Error) -> bool {
    if let rusqlite::Error::SqliteFailure(failure, _) = error
        && matches!(failure.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    {
        return true;
    }
    error.to_string().to_ascii_lowercase().contains(LOCKED_MESSAGE)
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Probe loop that waits for a database to become unlocked.
#[derive(Debug, Clone)]
pub struct LockGate<S = ThreadSleeper> {
    /// Connection settings used for every probe.
    config: SqliteConnectionConfig,
    /// Behavior on a locked probe.
    retry: RetryPolicy,
    /// Delay implementation between probes.
    sleeper: S,
}

impl LockGate<ThreadSleeper> {
    /// Builds a gate that sleeps on the current thread between probes.
    #[must_use]
    pub const fn new(config: SqliteConnectionConfig, retry: RetryPolicy) -> Self {
        Self {
            config,
            retry,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S: Sleeper> LockGate<S> {
    /// Builds a gate with a caller-supplied [`Sleeper`].
    #[must_use]
    pub const fn with_sleeper(
        config: SqliteConnectionConfig,
        retry: RetryPolicy,
        sleeper: S,
    ) -> Self {
        Self {
            config,
            retry,
            sleeper,
        }
    }

    /// Probes until unlocked, or once when retry is disabled.
    ///
    /// `on_retry` runs before each sleep with the number of probes so far and
    /// the interval about to elapse.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteGateError`] as soon as any probe fails for a reason
    /// other than a lock condition.
    pub fn wait<F>(&self, mut on_retry: F) -> Result<GateOutcome, SqliteGateError>
    where
        F: FnMut(u64, Duration),
    {
        let mut probes = 0u64;
        loop {
            probes = probes.saturating_add(1);
            match probe(&self.config)? {
                LockState::Unlocked => {
                    return Ok(GateOutcome::Unlocked {
                        probes,
                    });
                }
                LockState::Locked => match self.retry {
                    RetryPolicy::Disabled => return Ok(GateOutcome::Locked),
                    RetryPolicy::Every(interval) => {
                        on_retry(probes, interval);
                        self.sleeper.sleep(interval);
                    }
                },
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
