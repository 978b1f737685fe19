// crates/sqlite-gate-cli/src/bin/db-update.rs
// ============================================================================
// Module: db-update Binary
// Description: Validated update-or-insert of one value into a SQLite table.
// Purpose: Write a single field keyed by an index column from the shell.
// Dependencies: clap, sqlite-gate-cli, sqlite-gate-config, sqlite-gate-store
// ============================================================================

//! ## Overview
//! `db-update` resolves the database from `--database`, `DATABASE_NAME`, or
//! the config file, checks the table and both columns against the live
//! schema, then updates the matching row or inserts a new one.
//!
//! Exit status is 1 for configuration, connection, and validation failures.
//! A statement that fails after validation is reported on stdout and the
//! process still exits 0. `--verbose` and `--log_file` output is produced for
//! every validated attempt, whatever its result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
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
use sqlite_gate_cli::t;
use sqlite_gate_cli::write_log::FileWriteLogSink;
use sqlite_gate_cli::write_log::NoopWriteLogSink;
use sqlite_gate_cli::write_log::WriteLogEvent;
use sqlite_gate_cli::write_log::WriteLogSink;
use sqlite_gate_config::DATABASE_ENV_VAR;
use sqlite_gate_store::SqliteGateError;
use sqlite_gate_store::SqliteUpsertWriter;
use sqlite_gate_store::UpsertOutcome;
use sqlite_gate_store::UpsertRequest;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Command-line arguments for `db-update`.
#[derive(Parser, Debug)]
#[command(name = "db-update", version, about = "Write data to a SQLite database.")]
struct Cli {
    /// Table to write to.
    table: String,
    /// Index value identifying the row.
    #[arg(allow_hyphen_values = true)]
    index: String,
    /// Column to write.
    field: String,
    /// Value to write.
    #[arg(allow_hyphen_values = true)]
    data: String,
    /// Column used to locate the row.
    #[arg(
        long = "index_field",
        visible_alias = "index-field",
        value_name = "NAME",
        default_value = "id"
    )]
    index_field: String,
    /// Print a confirmation line after the write.
    #[arg(long)]
    verbose: bool,
    /// Append a record of the write to this file.
    #[arg(long = "log_file", visible_alias = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Database file (overrides `DATABASE_NAME`).
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,
    /// Engine busy timeout for the connection.
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

/// Resolves the database, performs the upsert, and reports the result.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    apply_locale(cli.lang)?;
    let config = load_config(cli.config.as_deref())?;

    let env_database = std::env::var(DATABASE_ENV_VAR).ok();
    let path = config
        .database_path(cli.database.as_deref(), env_database.as_deref())
        .map_err(|_| CliError::new(t!("update.missing_database", env = DATABASE_ENV_VAR)))?;
    let connection = config.connection_config(path, cli.busy_timeout_ms);

    let request = UpsertRequest {
        table: cli.table,
        index_column: cli.index_field,
        index_value: cli.index,
        data_column: cli.field,
        data: cli.data,
    };
    let outcome = {
        let mut writer = SqliteUpsertWriter::open(&connection)
            .map_err(|err| CliError::new(describe_store_error(&err)))?;
        writer.upsert(&request).map_err(|err| CliError::new(describe_store_error(&err)))?
    };

    if let UpsertOutcome::Failed {
        message, ..
    } = &outcome
    {
        emit_stdout_line(&t!("update.execute_failed", error = message))?;
    }
    if cli.verbose {
        emit_stdout_line(&t!("update.verbose.ok"))?;
    }
    record_write(cli.log_file.as_deref(), &request)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Appends the write record when a log file was requested.
fn record_write(log_file: Option<&Path>, request: &UpsertRequest) -> CliResult<()> {
    let sink: Box<dyn WriteLogSink> = match log_file {
        Some(path) => Box::new(FileWriteLogSink::new(path).map_err(|err| {
            CliError::new(t!("update.log.open_failed", path = path.display(), error = err))
        })?),
        None => Box::new(NoopWriteLogSink),
    };
    sink.record(&WriteLogEvent::data_written(request)).map_err(|err| {
        let path = log_file.map(|path| path.display().to_string()).unwrap_or_default();
        CliError::new(t!("update.log.write_failed", path = path, error = err))
    })
}

/// Renders a store error as a localized message.
fn describe_store_error(error: &SqliteGateError) -> String {
    match error {
        SqliteGateError::Connect(message) | SqliteGateError::Invalid(message) => {
            t!("update.connect_failed", error = message)
        }
        SqliteGateError::UnknownTable {
            table,
        } => t!("update.invalid_table", table = table),
        SqliteGateError::UnknownColumn {
            column, ..
        } => t!("update.invalid_column", column = column),
        SqliteGateError::UnknownIndexColumn {
            column, ..
        } => t!("update.invalid_index_column", column = column),
        SqliteGateError::Db(message) => t!("update.failed", error = message),
    }
}
