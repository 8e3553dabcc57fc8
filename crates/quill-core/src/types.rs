//! Core types for quill.
//!
//! This module defines the fundamental data structures shared across the
//! pipeline: the immutable [`LogRecord`] produced per log call, its
//! [`Level`] and [`Category`], and the captured [`ExceptionInfo`] value.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Structured context attached to a record.
///
/// A `BTreeMap` rather than a `HashMap` so that both formatters iterate the
/// fields in one deterministic (sorted) order — identical inputs must
/// produce byte-identical output.
pub type FieldMap = BTreeMap<String, serde_json::Value>;

/// The closed set of values a field may hold: scalars, arrays, and nested
/// maps, as modelled by `serde_json`.
pub use serde_json::Value as FieldValue;

/// Record keys owned by the pipeline. A caller-supplied field with one of
/// these names never displaces the record's own value.
pub const RESERVED_FIELDS: &[&str] = &["timestamp", "level", "logger", "message", "duration_ms"];

/// Build a [`FieldMap`] from `key => value` pairs.
///
/// ```rust
/// let fields = quill_core::fields! {
///     "platform" => "twitter",
///     "items_found" => 42,
/// };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => { $crate::FieldMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::FieldMap::new();
        $(map.insert(($key).to_string(), $crate::FieldValue::from($value));)+
        map
    }};
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Log severity, totally ordered from `Debug` up to `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
            Level::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" => Ok(Level::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Returned when a string names no known [`Level`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown log level {0:?} (expected DEBUG, INFO, WARNING, ERROR, or CRITICAL)")]
pub struct ParseLevelError(String);

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Fixed top-level log grouping. Each category (except `Main`) owns a
/// subdirectory of the trace root; `Main` routes to the top-level
/// `main.log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Scrapers,
    Processing,
    Feeds,
    Storage,
    Monitoring,
    Errors,
    Performance,
    Main,
}

impl Category {
    /// Subdirectory under the trace root, or `None` for `Main`.
    pub fn subdir(self) -> Option<&'static str> {
        match self {
            Category::Scrapers => Some("scrapers"),
            Category::Processing => Some("processing"),
            Category::Feeds => Some("feeds"),
            Category::Storage => Some("storage"),
            Category::Monitoring => Some("monitoring"),
            Category::Errors => Some("errors"),
            Category::Performance => Some("performance"),
            Category::Main => None,
        }
    }

    /// All categories that own a subdirectory.
    pub fn scoped() -> &'static [Category] {
        &[
            Category::Scrapers,
            Category::Processing,
            Category::Feeds,
            Category::Storage,
            Category::Monitoring,
            Category::Errors,
            Category::Performance,
        ]
    }

    /// Parse a category name, falling back to `Main` for anything
    /// unrecognised. A routing miss is recovered, never raised.
    pub fn parse_lossy(s: &str) -> Category {
        match s.to_ascii_lowercase().as_str() {
            "scrapers" => Category::Scrapers,
            "processing" => Category::Processing,
            "feeds" => Category::Feeds,
            "storage" => Category::Storage,
            "monitoring" => Category::Monitoring,
            "errors" => Category::Errors,
            "performance" => Category::Performance,
            _ => Category::Main,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.subdir().unwrap_or("main"))
    }
}

// ---------------------------------------------------------------------------
// ExceptionInfo
// ---------------------------------------------------------------------------

/// An error captured as a value at the moment of reporting: type name,
/// message, and the ordered cause chain (outermost first). The pipeline
/// never holds a live reference to the original error beyond capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionInfo {
    pub kind: String,
    pub message: String,
    pub frames: Vec<String>,
}

impl ExceptionInfo {
    /// Capture an error and its `source()` chain.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let mut frames = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            frames.push(cause.to_string());
            source = cause.source();
        }
        Self {
            kind: short_type_name(std::any::type_name::<E>()),
            message: err.to_string(),
            frames,
        }
    }

    /// Build from explicit parts (used when no live error value exists).
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        frames: Vec<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            frames,
        }
    }
}

/// Trim a fully qualified type path down to its last two segments:
/// `std::io::Error` becomes `io::Error`, a bare name stays as-is.
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let mut segments: Vec<&str> = base.rsplit("::").take(2).collect();
    segments.reverse();
    segments.join("::")
}

// ---------------------------------------------------------------------------
// LogRecord
// ---------------------------------------------------------------------------

/// One immutable log record, produced per log call and fanned out to every
/// sink the routing table names for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Wall-clock time of the call; rendered at second resolution.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: Level,
    /// Name the producer registered under (e.g. `twitter`).
    pub logger: Arc<str>,
    pub category: Category,
    pub message: String,
    /// Caller-supplied structured context. Keys colliding with
    /// [`RESERVED_FIELDS`] lose to the record's own values.
    pub fields: FieldMap,
    pub exception: Option<ExceptionInfo>,
    /// Set by performance scopes; presence routes the record into the
    /// performance sink.
    pub duration_ms: Option<u64>,
}

impl LogRecord {
    /// New record stamped with the current wall-clock time.
    pub fn new(
        level: Level,
        logger: Arc<str>,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            level,
            logger,
            category,
            message: message.into(),
            fields: FieldMap::new(),
            exception: None,
            duration_ms: None,
        }
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn level_round_trips_through_display_and_fromstr() {
        for level in [
            Level::Debug,
            Level::Info,
            Level::Warning,
            Level::Error,
            Level::Critical,
        ] {
            assert_eq!(level.to_string().parse::<Level>().unwrap(), level);
        }
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn unknown_category_falls_back_to_main() {
        assert_eq!(Category::parse_lossy("scrapers"), Category::Scrapers);
        assert_eq!(Category::parse_lossy("STORAGE"), Category::Storage);
        assert_eq!(Category::parse_lossy("telemetry"), Category::Main);
        assert_eq!(Category::parse_lossy(""), Category::Main);
    }

    #[test]
    fn exception_capture_walks_the_cause_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer failed")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let info = ExceptionInfo::from_error(&err);
        assert!(info.kind.ends_with("Outer"));
        assert_eq!(info.message, "outer failed");
        assert_eq!(info.frames, vec!["denied".to_string()]);
    }

    #[test]
    fn short_type_name_keeps_last_two_segments() {
        assert_eq!(short_type_name("std::io::Error"), "io::Error");
        assert_eq!(short_type_name("ParseLevelError"), "ParseLevelError");
        assert_eq!(
            short_type_name("core::num::ParseIntError"),
            "num::ParseIntError"
        );
    }

    #[test]
    fn fields_macro_builds_sorted_map() {
        let fields = fields! {
            "zebra" => 1,
            "alpha" => "first",
        };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "zebra"]);
    }
}
