// crates/sqlite-gate-cli/src/write_log.rs
// ============================================================================
// Module: Write Log Sinks
// Description: Append-only text records of db-update writes.
// Purpose: Persist one line per upsert attempt when `--log_file` is given.
// Dependencies: sqlite-gate-store, time
// ============================================================================

//! ## Overview
//! A [`WriteLogEvent`] renders as a single line:
//! `<timestamp> INFO Data written to <table>: Index=<v>, Field=<f>, Data=<d>`.
//! The record is written for every attempt that passed validation, whether
//! or not the statement itself succeeded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use sqlite_gate_store::UpsertRequest;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Events
// ============================================================================

/// One upsert attempt as recorded in the write log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteLogEvent {
    /// Time the record was produced (UTC).
    pub timestamp: OffsetDateTime,
    /// Severity label.
    pub level: &'static str,
    /// Target table.
    pub table: String,
    /// Index value supplied by the caller.
    pub index: String,
    /// Data column written.
    pub field: String,
    /// Value written.
    pub data: String,
}

impl WriteLogEvent {
    /// Builds an `INFO` record for `request`, stamped now.
    #[must_use]
    pub fn data_written(request: &UpsertRequest) -> Self {
        Self::data_written_at(request, OffsetDateTime::now_utc())
    }

    /// Builds an `INFO` record for `request` with an explicit timestamp.
    #[must_use]
    pub fn data_written_at(request: &UpsertRequest, timestamp: OffsetDateTime) -> Self {
        Self {
            timestamp,
            level: "INFO",
            table: request.table.clone(),
            index: request.index_value.clone(),
            field: request.data_column.clone(),
            data: request.data.clone(),
        }
    }

    /// Renders the record as a log line without a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        let timestamp = self
            .timestamp
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.timestamp.unix_timestamp().to_string());
        format!(
            "{timestamp} {} Data written to {}: Index={}, Field={}, Data={}",
            self.level, self.table, self.index, self.field, self.data
        )
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for write log records.
pub trait WriteLogSink {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the record cannot be persisted.
    fn record(&self, event: &WriteLogEvent) -> io::Result<()>;
}

/// Appends records to a text file, flushing after each line.
pub struct FileWriteLogSink {
    /// File handle opened in append mode.
    file: Mutex<std::fs::File>,
}

impl FileWriteLogSink {
    /// Opens `path` for appending, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl WriteLogSink for FileWriteLogSink {
    fn record(&self, event: &WriteLogEvent) -> io::Result<()> {
        let mut file =
            self.file.lock().map_err(|_| io::Error::other("write log file lock poisoned"))?;
        writeln!(file, "{}", event.render())?;
        file.flush()
    }
}

/// Sink used when no log file was requested.
pub struct NoopWriteLogSink;

impl WriteLogSink for NoopWriteLogSink {
    fn record(&self, _event: &WriteLogEvent) -> io::Result<()> {
        Ok(())
    }
}
