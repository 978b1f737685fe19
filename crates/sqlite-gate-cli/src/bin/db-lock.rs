// crates/sqlite-gate-cli/src/bin/db-lock.rs
// ============================================================================
// Module: db-lock Binary
// Description: Probe a SQLite database for a lock, then run a command.
// Purpose: Let scripts wait for a database to become writable.
// Dependencies: clap, sqlite-gate-cli, sqlite-gate-config, sqlite-gate-store
// ============================================================================

//! ## Overview
//! `db-lock` probes the database once. A locked database exits with status 1
//! unless `--retry` is given, in which case it re-probes on a fixed interval
//! until the lock clears. Once unlocked, the optional script runs with its
//! arguments and its captured output is replayed on stdout. The script's
//! exit status does not affect ours.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sqlite_gate_cli::output::CliError;
use sqlite_gate_cli::output::CliResult;
use sqlite_gate_cli::output::LangArg;
use sqlite_gate_cli::output::apply_locale;
use sqlite_gate_cli::output::emit_error;
use sqlite_gate_cli::output::emit_stdout_line;
use sqlite_gate_cli::output::load_config;
use sqlite_gate_cli::output::write_stderr_line;
use sqlite_gate_cli::subprocess::run_captured;
use sqlite_gate_cli::t;
use sqlite_gate_store::GateOutcome;
use sqlite_gate_store::LockGate;
use sqlite_gate_store::RetryPolicy;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Command-line arguments for `db-lock`.
#[derive(Parser, Debug)]
#[command(name = "db-lock", version, about = "Check if a SQLite database is locked.")]
struct Cli {
    /// Keep probing until the database is unlocked.
    #[arg(short = 'r', long)]
    retry: bool,
    /// Seconds between probes in retry mode.
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1 ..)
    )]
    retry_interval_secs: Option<u64>,
    /// Engine busy timeout for the probe connection.
    #[arg(
        long,
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(0 ..= 600_000)
    )]
    busy_timeout_ms: Option<u64>,
    /// Optional config file (defaults to `SQLITE_GATE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output language.
    #[arg(long, value_enum, value_name = "LANG")]
    lang: Option<LangArg>,
    /// SQLite database file to check.
    #[arg(value_name = "DB_FILE")]
    db_file: PathBuf,
    /// Script to run once unlocked, followed by its arguments.
    #[arg(
        value_name = "SCRIPT",
        num_args = 0 ..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Probes the database and runs the gated script.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    apply_locale(cli.lang)?;
    let config = load_config(cli.config.as_deref())?;

    let connection = config.connection_config(cli.db_file.clone(), cli.busy_timeout_ms);
    let retry = if cli.retry {
        RetryPolicy::Every(config.retry_interval(cli.retry_interval_secs))
    } else {
        RetryPolicy::Disabled
    };
    let gate = LockGate::new(connection, retry);
    let outcome = gate
        .wait(|attempt, interval| {
            // Notice write failures do not interrupt the wait; stderr is the
            // only channel that could report them.
            let _ = write_stderr_line(&t!(
                "lock.retry_wait",
                attempt = attempt,
                seconds = interval.as_secs()
            ));
        })
        .map_err(|err| CliError::new(t!("lock.probe_failed", error = err)))?;

    if outcome == GateOutcome::Locked {
        emit_stdout_line(&t!("lock.locked"))?;
        return Ok(ExitCode::FAILURE);
    }

    if let Some((script, args)) = cli.command.split_first() {
        let captured = run_captured(script, args).map_err(|err| {
            CliError::new(t!("lock.script.spawn_failed", script = script, error = err))
        })?;
        for text in captured.replay_lines() {
            emit_stdout_line(text)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
