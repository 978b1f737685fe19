// crates/sqlite-gate-config/src/config.rs
// ============================================================================
// Module: SQLite Gate Configuration
// Description: Configuration loading and validation for the SQLite Gate tools.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: sqlite-gate-store, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is an optional TOML file with strict size and path limits.
//! No file means defaults. The database path for `db-update` is resolved from
//! an explicit flag, then the `DATABASE_NAME` value, then the file; when none
//! is present the tool must stop before connecting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use sqlite_gate_store::DEFAULT_BUSY_TIMEOUT_MS;
use sqlite_gate_store::DEFAULT_RETRY_INTERVAL;
use sqlite_gate_store::SqliteConnectionConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable naming an optional config file.
pub const CONFIG_ENV_VAR: &str = "SQLITE_GATE_CONFIG";
/// Environment variable supplying the `db-update` database path.
pub const DATABASE_ENV_VAR: &str = "DATABASE_NAME";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for the engine busy timeout (ms).
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level `sqlite-gate.toml` model.
///
/// # Invariants
/// - Unknown keys are rejected.
/// - [`SqliteGateConfig::validate`] has passed for any value returned by
///   [`SqliteGateConfig::load`] or [`SqliteGateConfig::from_toml_str`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteGateConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Lock gate retry settings.
    #[serde(default)]
    pub lock_gate: LockGateConfig,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Fallback database path for `db-update`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Engine busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// `[lock_gate]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockGateConfig {
    /// Delay between probes in retry mode (seconds).
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

impl Default for LockGateConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: default_retry_interval_secs(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default retry interval in seconds.
const fn default_retry_interval_secs() -> u64 {
    DEFAULT_RETRY_INTERVAL.as_secs()
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl SqliteGateConfig {
    /// Loads configuration from `path`, or returns defaults for `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.lock_gate.validate()
    }

    /// Resolves the `db-update` database path.
    ///
    /// Precedence: `flag`, then `env_value` (the `DATABASE_NAME` value), then
    /// `[database].path`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabasePath`] when no source is set.
    pub fn database_path(
        &self,
        flag: Option<&Path>,
        env_value: Option<&str>,
    ) -> Result<PathBuf, ConfigError> {
        if let Some(path) = flag.filter(|path| !path.as_os_str().is_empty()) {
            return Ok(path.to_path_buf());
        }
        if let Some(value) = env_value.filter(|value| !value.trim().is_empty()) {
            return Ok(PathBuf::from(value));
        }
        if let Some(path) = self.database.path.as_ref().filter(|path| !path.as_os_str().is_empty())
        {
            return Ok(path.clone());
        }
        Err(ConfigError::MissingDatabasePath)
    }

    /// Builds connection settings for `path`, applying an optional override.
    #[must_use]
    pub fn connection_config(
        &self,
        path: PathBuf,
        busy_timeout_override: Option<u64>,
    ) -> SqliteConnectionConfig {
        SqliteConnectionConfig {
            path,
            busy_timeout_ms: busy_timeout_override.unwrap_or(self.database.busy_timeout_ms),
        }
    }

    /// Returns the retry interval, applying an optional override in seconds.
    #[must_use]
    pub fn retry_interval(&self, override_secs: Option<u64>) -> Duration {
        Duration::from_secs(override_secs.unwrap_or(self.lock_gate.retry_interval_secs))
    }
}

impl DatabaseConfig {
    /// Validates database settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "database.busy_timeout_ms out of range: {} (max {MAX_BUSY_TIMEOUT_MS})",
                self.busy_timeout_ms
            )));
        }
        if let Some(path) = &self.path {
            validate_path(path)?;
        }
        Ok(())
    }
}

impl LockGateConfig {
    /// Validates lock gate settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "lock_gate.retry_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Picks the config file path from the `--config` flag or the
/// `SQLITE_GATE_CONFIG` value.
#[must_use]
pub fn resolve_config_path(flag: Option<&Path>, env_value: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }
    env_value.filter(|value| !value.trim().is_empty()).map(PathBuf::from)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// No database path was supplied by any source.
    #[error("DATABASE_NAME environment variable is not set")]
    MissingDatabasePath,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
