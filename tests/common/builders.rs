//! Test builders — temp-directory registries and fixed-clock records.
//!
//! These helpers are designed for readability in assertions, not for
//! production use. They panic on invalid input rather than returning
//! `Result`.

use std::path::Path;
use std::sync::Arc;

use chrono::TimeZone;
use quill::{Category, ExceptionInfo, FieldMap, Level, LogRecord, Registry, TraceConfig};

// ---------------------------------------------------------------------------
// Registries
// ---------------------------------------------------------------------------

/// A registry rooted in a fresh temp directory. Keep the `TempDir` alive
/// for the duration of the test; dropping it deletes the tree.
pub fn temp_registry(config: TraceConfig) -> (tempfile::TempDir, Arc<Registry>) {
    let dir = tempfile::tempdir().expect("create temp trace root");
    let registry =
        Registry::new(config.with_root(dir.path())).expect("construct registry in temp dir");
    (dir, registry)
}

/// [`temp_registry`] with the built-in defaults.
pub fn default_registry() -> (tempfile::TempDir, Arc<Registry>) {
    temp_registry(TraceConfig::defaults())
}

// ---------------------------------------------------------------------------
// Fixed clock
// ---------------------------------------------------------------------------

/// The timestamp every deterministic record carries:
/// `2024-01-15 10:00:00` UTC.
pub fn fixed_ts() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// RecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for fixed-clock [`LogRecord`] fixtures.
///
/// The `logger` and `category` on the built record are placeholders —
/// [`quill::Logger::log_record`] overwrites them with the handle's own.
///
/// # Example
///
/// ```rust,ignore
/// let record = RecordBuilder::new("timeout connecting to db")
///     .level(Level::Error)
///     .field("request_id", "req-abc123")
///     .build();
/// logger.log_record(record);
/// ```
pub struct RecordBuilder {
    ts: chrono::DateTime<chrono::Utc>,
    level: Level,
    message: String,
    fields: FieldMap,
    exception: Option<ExceptionInfo>,
    duration_ms: Option<u64>,
}

impl RecordBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ts: fixed_ts(),
            level: Level::Info,
            message: message.into(),
            fields: FieldMap::new(),
            exception: None,
            duration_ms: None,
        }
    }

    pub fn ts(mut self, ts: chrono::DateTime<chrono::Utc>) -> Self {
        self.ts = ts;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn exception(mut self, kind: &str, message: &str, frames: &[&str]) -> Self {
        self.exception = Some(ExceptionInfo::new(
            kind,
            message,
            frames.iter().map(|f| f.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> LogRecord {
        LogRecord {
            timestamp: self.ts,
            level: self.level,
            logger: Arc::from("builder"),
            category: Category::Main,
            message: self.message,
            fields: self.fields,
            exception: self.exception,
            duration_ms: self.duration_ms,
        }
    }
}

/// Build an INFO record with the fixed timestamp.
pub fn info_record(message: &str) -> LogRecord {
    RecordBuilder::new(message).build()
}

/// Build an ERROR record with the fixed timestamp.
pub fn error_record(message: &str) -> LogRecord {
    RecordBuilder::new(message).level(Level::Error).build()
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Read a log file to a string; a missing file reads as empty.
pub fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

/// Count complete lines in a log file.
pub fn line_count(path: &Path) -> usize {
    read_log(path).lines().count()
}

/// Size in bytes, or 0 when the file does not exist.
pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
