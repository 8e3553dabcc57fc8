//! Error reporting — exception capture with caller context.
//!
//! [`report`] snapshots an error as an [`ExceptionInfo`] value, merges the
//! caller's context map into the record fields, and emits one ERROR record
//! through the logger — which the routing table fans into the dedicated
//! error sink. A condensed duplicate additionally lands in
//! `errors/exceptions.log`, keeping one file of nothing but reported
//! failures.
//!
//! The error is never consumed or mutated; whether to recover or propagate
//! stays the caller's decision.

use std::sync::Arc;

use quill_core::format;
use quill_core::{ExceptionInfo, FieldMap, FieldValue, Level, LogRecord};

use crate::logger::Logger;

/// Capture `error` with `context` and emit it at ERROR through `logger`.
pub fn report<E: std::error::Error>(logger: &Logger, error: &E, context: FieldMap) {
    if Level::Error < logger.threshold() {
        return;
    }
    let info = ExceptionInfo::from_error(error);

    // Reporter-owned keys land after the merge so they win over any
    // identically named context key.
    let mut fields = context;
    fields.insert(
        "error_kind".to_string(),
        FieldValue::from(info.kind.as_str()),
    );
    fields.insert(
        "error_message".to_string(),
        FieldValue::from(info.message.as_str()),
    );

    let message = format!("error occurred: {}: {}", info.kind, info.message);
    let record = LogRecord::new(
        Level::Error,
        logger.name().into(),
        logger.category(),
        message,
    )
    .with_fields(fields)
    .with_exception(info.clone());
    logger.log_record(record);

    write_exceptions_duplicate(logger, &info);
}

/// The condensed `errors/exceptions.log` duplicate: who reported, what
/// kind, what message — no context payload.
fn write_exceptions_duplicate(logger: &Logger, info: &ExceptionInfo) {
    let Some(exceptions) = &logger.routes().exceptions else {
        return;
    };
    if logger
        .routes()
        .primary
        .iter()
        .any(|s| Arc::ptr_eq(s, exceptions))
    {
        return;
    }
    let record = LogRecord::new(
        Level::Error,
        logger.name().into(),
        logger.category(),
        format!(
            "Exception in {}: {}: {}",
            logger.name(),
            info.kind,
            info.message
        ),
    )
    .with_exception(info.clone());
    exceptions.write(format::render(logger.format(), &record).as_bytes());
}
