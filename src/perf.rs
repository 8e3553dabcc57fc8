//! Performance scopes — duration and outcome logging for units of work.
//!
//! A [`PerfScope`] logs `operation started` on entry and exactly one
//! outcome record on exit, with wall-clock `duration_ms` measured from
//! entry to exit regardless of suspension in between. Which outcome
//! depends on how the exit is observed:
//!
//! | Exit                               | Record                 | Level   |
//! |------------------------------------|------------------------|---------|
//! | [`PerfScope::complete`]            | `operation completed`  | INFO    |
//! | [`measure`]/[`measure_async`] `Err`| `operation failed`     | WARNING |
//! | dropped while panicking            | `operation failed`     | WARNING |
//! | dropped otherwise (e.g. a dropped  | `operation cancelled`  | INFO    |
//! |   future)                          |                        |         |
//!
//! The completed record carries `duration_ms`, so the routing table fans
//! it into the performance sink as a condensed `operation: Nms` line.
//! Scopes hold no cross-scope lock; nested and concurrent scopes on the
//! same logger interleave freely.

use std::time::Instant;

use quill_core::{FieldMap, FieldValue, Level, LogRecord};

use crate::logger::Logger;

/// A bounded unit of work instrumented for duration and outcome logging.
pub struct PerfScope {
    logger: Logger,
    operation: String,
    fields: FieldMap,
    started: Instant,
    finished: bool,
}

impl PerfScope {
    /// Enter a scope, logging `operation started` at INFO.
    pub fn enter(logger: &Logger, operation: &str) -> Self {
        Self::enter_with(logger, operation, FieldMap::new())
    }

    /// Enter a scope with extra context carried on every record it emits.
    pub fn enter_with(logger: &Logger, operation: &str, fields: FieldMap) -> Self {
        let mut started_fields = fields.clone();
        started_fields.insert("operation".to_string(), FieldValue::from(operation));
        logger.log(
            Level::Info,
            &format!("operation started: {operation}"),
            started_fields,
        );
        Self {
            logger: logger.clone(),
            operation: operation.to_string(),
            fields,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Normal exit: log `operation completed` at INFO with the measured
    /// duration.
    pub fn complete(mut self) {
        self.finish(Level::Info, "completed");
    }

    /// Cooperative cancellation, made explicit. Dropping the scope without
    /// completing it records the same outcome.
    pub fn cancel(mut self) {
        self.finish(Level::Info, "cancelled");
    }

    /// Failed exit: log `operation failed` at WARNING with the error
    /// rendered into the fields. The caller keeps the error.
    pub fn fail_with(mut self, error: &dyn std::fmt::Display) {
        self.fields
            .insert("error".to_string(), FieldValue::from(error.to_string()));
        self.finish(Level::Warning, "failed");
    }

    fn finish(&mut self, level: Level, outcome: &str) {
        if self.finished {
            return;
        }
        self.finished = true;
        let duration_ms = self.started.elapsed().as_millis() as u64;

        let mut fields = std::mem::take(&mut self.fields);
        fields.insert(
            "operation".to_string(),
            FieldValue::from(self.operation.as_str()),
        );
        let record = LogRecord::new(
            level,
            self.logger.name().into(),
            self.logger.category(),
            format!("operation {outcome}: {}", self.operation),
        )
        .with_fields(fields)
        .with_duration_ms(duration_ms);
        self.logger.log_record(record);
    }
}

impl Drop for PerfScope {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Unwinding through the scope is the failure path; any other drop
        // without completion means the work was abandoned before its end —
        // for a future, that is cancellation.
        if std::thread::panicking() {
            self.finish(Level::Warning, "failed");
        } else {
            self.finish(Level::Info, "cancelled");
        }
    }
}

/// Run a fallible closure inside a scope: `Ok` completes, `Err` logs
/// `operation failed` and is returned unchanged.
pub fn measure<T, E, F>(logger: &Logger, operation: &str, fields: FieldMap, work: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    let scope = PerfScope::enter_with(logger, operation, fields);
    match work() {
        Ok(value) => {
            scope.complete();
            Ok(value)
        }
        Err(err) => {
            scope.fail_with(&err);
            Err(err)
        }
    }
}

/// The suspendable twin of [`measure`]: wraps a future, measuring from
/// first entry to final exit. Dropping the returned future before it
/// resolves logs `operation cancelled`.
pub async fn measure_async<T, E, F>(
    logger: &Logger,
    operation: &str,
    fields: FieldMap,
    work: F,
) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let scope = PerfScope::enter_with(logger, operation, fields);
    match work.await {
        Ok(value) => {
            scope.complete();
            Ok(value)
        }
        Err(err) => {
            scope.fail_with(&err);
            Err(err)
        }
    }
}
