//! quill-core — shared types, formatters, and configuration for quill.
//!
//! This crate defines the value types that flow through the logging
//! pipeline, the two wire formats they can be rendered in, and the
//! configuration surface the registry is built from.
//!
//! # Architecture
//!
//! ```text
//! Logger ──► LogRecord ──► Formatter ──► RotatingSink(s)
//!               │
//!               └── Level / Category / FieldMap / ExceptionInfo
//! ```
//!
//! Everything here is plain data: no I/O, no process-wide state. The sinks
//! live in `quill-sink`; the router and registry live in the root crate.

pub mod config;
pub mod format;
pub mod types;

pub use config::{RetentionConfig, RotationConfig, TraceConfig};
pub use format::FormatMode;
pub use types::{Category, ExceptionInfo, FieldMap, FieldValue, Level, LogRecord};
