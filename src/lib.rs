//! quill — file-only structured logging with category fan-out.
//!
//! Centralized logging for a multi-component data-collection pipeline.
//! Every record is written to rotating files under a `trace/` directory
//! with no console output, routed by category and duplicated into
//! cross-cutting error and performance sinks.
//!
//! # Architecture
//!
//! ```text
//! producers ──► Logger ──► Formatter ──► RotatingSink(s)
//!                 │                          ▲
//!                 └── RouteSet ◄── Router ───┘
//!                                    │
//!                              Registry (initialize / get_logger / cleanup)
//! ```
//!
//! Each sink serializes its own writes; there is no global lock. The
//! registry is constructed once and read-only afterwards.
//!
//! # Example
//!
//! ```no_run
//! use quill::{fields, Category, Level};
//!
//! let logger = quill::get_logger("twitter", Category::Scrapers);
//! logger.info("starting to scrape trending topics");
//! logger.log(Level::Warning, "rate limit approaching", fields! {
//!     "remaining" => 12,
//!     "window" => "15m",
//! });
//!
//! let result = quill::perf::measure(&logger, "scrape_trending", fields! {}, || {
//!     Ok::<_, std::io::Error>(42)
//! });
//! assert_eq!(result.unwrap(), 42);
//! ```

pub mod logger;
pub mod perf;
pub mod registry;
pub mod report;
pub mod router;

pub use logger::Logger;
pub use perf::PerfScope;
pub use registry::{
    cleanup, get_logger, get_processing_logger, get_scraper_logger, get_storage_logger,
    initialize, spawn_retention_task, InitError, Registry,
};
pub use report::report;
pub use router::{RouteSet, Router};

pub use quill_core::{
    fields, Category, ExceptionInfo, FieldMap, FieldValue, FormatMode, Level, LogRecord,
    TraceConfig,
};
pub use quill_sink::{RotatingSink, SweepReport};
