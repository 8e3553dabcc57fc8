//! Record rendering — the two interchangeable wire formats.
//!
//! One [`FormatMode`] is selected at initialization and applied uniformly
//! across every sink for the process lifetime:
//!
//! - **Line**: `[YYYY-MM-DD HH:MM:SS] [LEVEL] [logger] message key=value …`
//!   with logfmt-style values and an indented exception block.
//! - **Json**: one self-contained JSON object per line — `timestamp`,
//!   `level`, `logger`, `message`, and an `extra` object carrying the
//!   fields, `duration_ms`, and `exception` when present.
//!
//! Both renderings are deterministic: identical records produce
//! byte-identical output, so sinks can be diffed in tests.

use serde::{Deserialize, Serialize};

use crate::types::{FieldValue, LogRecord, RESERVED_FIELDS};

/// Which wire format the process renders records in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    Line,
    Json,
}

impl std::str::FromStr for FormatMode {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" => Ok(FormatMode::Line),
            "json" => Ok(FormatMode::Json),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Returned when a string names no known [`FormatMode`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown format {0:?} (expected \"line\" or \"json\")")]
pub struct ParseFormatError(String);

/// Render a record in the given mode. Always ends in a single `\n`; the
/// result is the exact byte sequence every sink in the fan-out receives.
pub fn render(mode: FormatMode, record: &LogRecord) -> String {
    match mode {
        FormatMode::Line => render_line(record),
        FormatMode::Json => render_json(record),
    }
}

/// Condensed rendering for the performance sink: the message collapses to
/// `operation: Nms` and only the duration survives as context.
pub fn render_condensed(mode: FormatMode, record: &LogRecord) -> String {
    let operation = record
        .fields
        .get("operation")
        .and_then(FieldValue::as_str)
        .unwrap_or(record.message.as_str());
    let duration_ms = record.duration_ms.unwrap_or(0);
    let message = format!("{operation}: {duration_ms}ms");

    match mode {
        FormatMode::Line => format!(
            "[{}] [{}] [{}] {}\n",
            stamp(record.timestamp),
            record.level,
            record.logger,
            message,
        ),
        FormatMode::Json => {
            let mut extra = serde_json::Map::new();
            extra.insert("duration_ms".to_string(), FieldValue::from(duration_ms));
            to_json_line(&JsonRecord {
                timestamp: stamp(record.timestamp),
                level: record.level.to_string(),
                logger: &record.logger,
                message: &message,
                extra,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Line mode
// ---------------------------------------------------------------------------

fn render_line(record: &LogRecord) -> String {
    let mut out = format!(
        "[{}] [{}] [{}] {}",
        stamp(record.timestamp),
        record.level,
        record.logger,
        record.message,
    );

    // Reserved keys already appear in the prefix; a caller field by the
    // same name loses.
    for (key, value) in &record.fields {
        if RESERVED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        out.push(' ');
        out.push_str(key);
        out.push('=');
        out.push_str(&render_value(value));
    }

    if let Some(duration_ms) = record.duration_ms {
        out.push_str(&format!(" duration_ms={duration_ms}"));
    }

    if let Some(exception) = &record.exception {
        out.push_str(&format!("\n    {}: {}", exception.kind, exception.message));
        for frame in &exception.frames {
            out.push_str(&format!("\n      caused by: {frame}"));
        }
    }

    out.push('\n');
    out
}

/// Logfmt-style value rendering: bare scalars stay bare, strings that
/// contain whitespace, quotes, or `=` are JSON-quoted, everything else is
/// compact JSON.
fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) if is_bare(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_bare(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| !c.is_whitespace() && c != '"' && c != '=')
}

// ---------------------------------------------------------------------------
// Json mode
// ---------------------------------------------------------------------------

/// Field order in the output follows this struct, not alphabetical order.
#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: String,
    logger: &'a str,
    message: &'a str,
    extra: serde_json::Map<String, FieldValue>,
}

fn render_json(record: &LogRecord) -> String {
    let mut extra = serde_json::Map::new();
    for (key, value) in &record.fields {
        extra.insert(key.clone(), value.clone());
    }
    // Record-owned values land last so they displace any caller field of
    // the same name inside `extra` as well.
    if let Some(duration_ms) = record.duration_ms {
        extra.insert("duration_ms".to_string(), FieldValue::from(duration_ms));
    }
    if let Some(exception) = &record.exception {
        extra.insert(
            "exception".to_string(),
            serde_json::json!({
                "kind": exception.kind,
                "message": exception.message,
                "frames": exception.frames,
            }),
        );
    }

    to_json_line(&JsonRecord {
        timestamp: stamp(record.timestamp),
        level: record.level.to_string(),
        logger: &record.logger,
        message: &record.message,
        extra,
    })
}

fn to_json_line(record: &JsonRecord<'_>) -> String {
    let mut out = serde_json::to_string(record)
        .expect("a JsonRecord has no unserializable shapes");
    out.push('\n');
    out
}

fn stamp(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
