// crates/sqlite-gate-cli/src/subprocess.rs
// ============================================================================
// Module: Gated Command Runner
// Description: Runs the command db-lock releases once the database is free.
// Purpose: Capture child output so it can be replayed on our stdout.
// Dependencies: Standard library process APIs.
// ============================================================================

//! ## Overview
//! The child inherits stdin and the environment. Its stdout and stderr are
//! captured in full and handed back; the caller decides how to print them.
//! The child's exit status is discarded.

use std::io;
use std::process::Command;
use std::process::Stdio;

/// Output collected from a finished child.
#[derive(Debug)]
pub struct CapturedOutput {
    /// Captured stdout, decoded lossily.
    pub stdout: String,
    /// Captured stderr, decoded lossily.
    pub stderr: String,
}

impl CapturedOutput {
    /// Returns the non-empty streams in replay order (stdout, then stderr).
    #[must_use]
    pub fn replay_lines(&self) -> Vec<&str> {
        [self.stdout.as_str(), self.stderr.as_str()]
            .into_iter()
            .filter(|text| !text.is_empty())
            .collect()
    }
}

/// Runs `program` with `args` and waits for it to finish.
///
/// # Errors
///
/// Returns an error when the program cannot be started.
pub fn run_captured(program: &str, args: &[String]) -> io::Result<CapturedOutput> {
    let output = Command::new(program).args(args).stdin(Stdio::inherit()).output()?;
    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
