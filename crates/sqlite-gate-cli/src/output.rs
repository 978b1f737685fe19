// crates/sqlite-gate-cli/src/output.rs
// ============================================================================
// Module: CLI Output Helpers
// Description: Error wrapper, stream writers, and locale selection.
// Purpose: Give both binaries one way to report results and failures.
// Dependencies: clap, sqlite-gate-config, thiserror
// ============================================================================

//! ## Overview
//! Every line a binary prints goes through [`write_stdout_line`] or
//! [`write_stderr_line`]. Fatal conditions become a [`CliError`], which the
//! entry point renders with [`emit_error`] and turns into exit status 1.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::ValueEnum;
use sqlite_gate_config::CONFIG_ENV_VAR;
use sqlite_gate_config::SqliteGateConfig;
use sqlite_gate_config::resolve_config_path;
use thiserror::Error;

use crate::i18n::Locale;
use crate::i18n::set_locale;
use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the output language.
pub const LANG_ENV: &str = "SQLITE_GATE_LANG";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Locale
// ============================================================================

/// Supported `--lang` selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

/// Resolves the locale from the `--lang` flag or the environment value.
///
/// # Errors
///
/// Returns [`CliError`] when `env_lang` names an unsupported locale.
pub fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Selects the process locale and prints the translation notice when needed.
///
/// # Errors
///
/// Returns [`CliError`] for an unsupported locale or a failed stderr write.
pub fn apply_locale(lang: Option<LangArg>) -> CliResult<()> {
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Loads the config file named by `--config` or `SQLITE_GATE_CONFIG`.
///
/// # Errors
///
/// Returns [`CliError`] when the file cannot be read or validated.
pub fn load_config(flag: Option<&Path>) -> CliResult<SqliteGateConfig> {
    let env_value = std::env::var(CONFIG_ENV_VAR).ok();
    let path = resolve_config_path(flag, env_value.as_deref());
    SqliteGateConfig::load(path.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
///
/// # Errors
///
/// Returns the underlying I/O error.
pub fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
///
/// # Errors
///
/// Returns the underlying I/O error.
pub fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Writes a line to stdout, mapping failures to [`CliError`].
///
/// # Errors
///
/// Returns [`CliError`] when stdout cannot be written.
pub fn emit_stdout_line(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Formats a localized output error message.
#[must_use]
pub fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
#[must_use]
pub fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
