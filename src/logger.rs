//! The per-component logger handle.
//!
//! A [`Logger`] binds a name and category to its resolved [`RouteSet`],
//! applies the process-wide severity threshold, and fans every accepted
//! record out to the sinks the routing table names for it. Handles are
//! cheap to clone and safe to share across threads; the only serialization
//! point is inside each sink.

use std::sync::Arc;

use quill_core::format::{self, FormatMode};
use quill_core::{Category, ExceptionInfo, FieldMap, FieldValue, Level, LogRecord};

use crate::router::RouteSet;

/// A producer-facing logging handle. Obtain one via
/// [`get_logger`](crate::get_logger) or [`Registry::logger`](crate::Registry::logger).
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    category: Category,
    threshold: Level,
    format: FormatMode,
    routes: RouteSet,
}

impl Logger {
    pub(crate) fn new(
        name: &str,
        category: Category,
        threshold: Level,
        format: FormatMode,
        routes: RouteSet,
    ) -> Self {
        Self {
            name: Arc::from(name),
            category,
            threshold,
            format,
            routes,
        }
    }

    /// A handle that filters normally but writes nowhere — handed out when
    /// the registry could not be constructed, so producers keep running.
    pub(crate) fn detached(name: &str, category: Category) -> Self {
        Self::new(
            name,
            category,
            Level::Info,
            FormatMode::Line,
            RouteSet::disabled(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub(crate) fn format(&self) -> FormatMode {
        self.format
    }

    pub(crate) fn threshold(&self) -> Level {
        self.threshold
    }

    pub(crate) fn routes(&self) -> &RouteSet {
        &self.routes
    }

    // -----------------------------------------------------------------------
    // Core logging API
    // -----------------------------------------------------------------------

    /// Log a message with structured context at an explicit level.
    pub fn log(&self, level: Level, message: &str, fields: FieldMap) {
        if level < self.threshold {
            return;
        }
        let record = LogRecord::new(level, self.name.clone(), self.category, message)
            .with_fields(fields);
        self.dispatch(record);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message, FieldMap::new());
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message, FieldMap::new());
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message, FieldMap::new());
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message, FieldMap::new());
    }

    pub fn critical(&self, message: &str) {
        self.log(Level::Critical, message, FieldMap::new());
    }

    /// Log at ERROR with a captured exception value attached. The error is
    /// only borrowed for the capture; the caller keeps it.
    pub fn error_with<E: std::error::Error>(&self, message: &str, error: &E, fields: FieldMap) {
        if Level::Error < self.threshold {
            return;
        }
        let record = LogRecord::new(Level::Error, self.name.clone(), self.category, message)
            .with_fields(fields)
            .with_exception(ExceptionInfo::from_error(error));
        self.dispatch(record);
    }

    /// Dispatch a pre-built record. The record's `logger` and `category`
    /// are overwritten with this handle's — a handle only ever speaks for
    /// itself. This is the deterministic path: the caller controls the
    /// timestamp.
    pub fn log_record(&self, mut record: LogRecord) {
        record.logger = self.name.clone();
        record.category = self.category;
        self.dispatch(record);
    }

    // -----------------------------------------------------------------------
    // Domain event helpers
    // -----------------------------------------------------------------------

    /// DEBUG note of an outbound API call.
    pub fn api_call(&self, method: &str, endpoint: &str, params: FieldMap) {
        let mut fields = params;
        fields.insert("method".to_string(), FieldValue::from(method));
        fields.insert("endpoint".to_string(), FieldValue::from(endpoint));
        self.log(
            Level::Debug,
            &format!("API call: {method} {endpoint}"),
            fields,
        );
    }

    /// INFO note of a bulk data operation (save, load, delete, …).
    pub fn data_operation(
        &self,
        operation: &str,
        data_type: &str,
        count: u64,
        metadata: FieldMap,
    ) {
        let mut fields = metadata;
        fields.insert("data_op".to_string(), FieldValue::from(operation));
        fields.insert("data_type".to_string(), FieldValue::from(data_type));
        fields.insert("count".to_string(), FieldValue::from(count));
        self.log(
            Level::Info,
            &format!("data operation: {operation} {count} {data_type}"),
            fields,
        );
    }

    /// INFO summary of a scraping session lifecycle change.
    pub fn scraping_session(
        &self,
        platform: &str,
        session_type: &str,
        status: &str,
        metrics: FieldMap,
    ) {
        let mut fields = metrics;
        fields.insert("platform".to_string(), FieldValue::from(platform));
        fields.insert("session_type".to_string(), FieldValue::from(session_type));
        fields.insert("status".to_string(), FieldValue::from(status));
        self.log(
            Level::Info,
            &format!("scraping session {status}: {platform} - {session_type}"),
            fields,
        );
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    fn dispatch(&self, record: LogRecord) {
        if record.level < self.threshold {
            return;
        }
        let rendered = format::render(self.format, &record);
        let bytes = rendered.as_bytes();

        for sink in &self.routes.primary {
            sink.write(bytes);
        }

        // Cross-cutting fan-out. `ptr_eq` guards stop a record from being
        // written twice when this logger's own file is a cross-cutting sink.
        if record.level >= Level::Error {
            if let Some(errors) = &self.routes.errors {
                if !self.routes.primary.iter().any(|s| Arc::ptr_eq(s, errors)) {
                    errors.write(bytes);
                }
            }
        }
        if record.duration_ms.is_some() {
            if let Some(performance) = &self.routes.performance {
                if !self
                    .routes
                    .primary
                    .iter()
                    .any(|s| Arc::ptr_eq(s, performance))
                {
                    performance.write(format::render_condensed(self.format, &record).as_bytes());
                }
            }
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
