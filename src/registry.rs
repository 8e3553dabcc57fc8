//! The process-wide logging registry.
//!
//! [`Registry`] is an explicit object with a defined construction step
//! ([`Registry::new`]) and a read-only lookup phase afterwards — nothing
//! here requires the ambient global, and every harness builds registries
//! against temp directories. The free functions ([`initialize`],
//! [`get_logger`], [`cleanup`]) are the process facade over a `OnceLock`
//! for producers that want the original one-call surface: the first
//! `initialize` wins and later calls are accepted no-ops.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use quill_core::{Category, TraceConfig};
use quill_sink::{sweep, SinkError, SweepReport};

use crate::logger::Logger;
use crate::router::Router;

/// Failure while constructing a [`Registry`] — the only fallible surface
/// of the pipeline. Once construction succeeds, logging never returns
/// errors to producers.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Owns the router, the logger cache, and the configuration snapshot.
pub struct Registry {
    config: TraceConfig,
    router: Router,
    loggers: Mutex<HashMap<String, Logger>>,
}

impl Registry {
    /// Create the trace directory tree and the cross-cutting sinks.
    pub fn new(config: TraceConfig) -> Result<Arc<Self>, InitError> {
        let router = Router::new(&config.root, config.rotation)?;
        Ok(Arc::new(Self {
            config,
            router,
            loggers: Mutex::new(HashMap::new()),
        }))
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Get or create the logger for `name`. Created lazily on first
    /// request, cached for the process lifetime; on a repeat request the
    /// original category wins and `category` is ignored.
    pub fn logger(&self, name: &str, category: Category) -> Logger {
        let mut loggers = self.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = loggers.get(name) {
            return logger.clone();
        }
        let routes = self.router.resolve(name, category);
        let logger = Logger::new(
            name,
            category,
            self.config.level,
            self.config.format,
            routes,
        );
        loggers.insert(name.to_string(), logger.clone());
        logger
    }

    /// Resolve a category by string, falling back to `Main` for unknown
    /// names — a routing miss is recovered, never an error.
    pub fn logger_lossy(&self, name: &str, category: &str) -> Logger {
        self.logger(name, Category::parse_lossy(category))
    }

    /// Delete aged log files under the trace root. Files held open by any
    /// sink survive regardless of age. The outcome is logged through an
    /// unscoped `cleanup` logger.
    pub fn cleanup(&self, days_to_keep: u64) -> SweepReport {
        let cutoff = SystemTime::now()
            .checked_sub(Duration::from_secs(days_to_keep * 24 * 60 * 60))
            .unwrap_or(UNIX_EPOCH);
        let report = sweep(&self.config.root, cutoff, &self.router.active_paths());

        let logger = self.logger("cleanup", Category::Main);
        logger.log(
            quill_core::Level::Info,
            "retention sweep complete",
            quill_core::fields! {
                "days_to_keep" => days_to_keep,
                "scanned" => report.scanned as u64,
                "deleted" => report.deleted as u64,
                "failed" => report.failed as u64,
            },
        );
        report
    }

    /// Total records dropped across all sinks after write retries —
    /// observability into the degraded path.
    pub fn dropped_records(&self) -> u64 {
        self.router.dropped_records()
    }

    /// Paths currently held open; exposed for the sweeper and for tests.
    pub fn active_paths(&self) -> std::collections::HashSet<PathBuf> {
        self.router.active_paths()
    }
}

// ---------------------------------------------------------------------------
// Process facade
// ---------------------------------------------------------------------------

static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Initialize the process-wide registry. Call once at startup; later calls
/// (any configuration) are no-ops that return the existing registry, so
/// re-initialization can never duplicate open file handles or double
/// records.
pub fn initialize(config: TraceConfig) -> Result<Arc<Registry>, InitError> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = REGISTRY.get() {
        return Ok(existing.clone());
    }
    let registry = Registry::new(config)?;
    let _ = REGISTRY.set(registry.clone());
    Ok(registry)
}

/// Get or create a logger from the process-wide registry, initializing it
/// with defaults first if nothing called [`initialize`] — the facility is
/// usable from the first call, like the system it serves.
///
/// Never fails: if even default initialization is impossible the returned
/// handle is detached (filters normally, writes nowhere) and the failure
/// is noted via `tracing`.
pub fn get_logger(name: &str, category: Category) -> Logger {
    match obtain() {
        Some(registry) => registry.logger(name, category),
        None => Logger::detached(name, category),
    }
}

/// Sweep aged files through the process-wide registry. A no-op reporting
/// zeros when initialization failed.
pub fn cleanup(days_to_keep: u64) -> SweepReport {
    obtain()
        .map(|registry| registry.cleanup(days_to_keep))
        .unwrap_or_default()
}

fn obtain() -> Option<Arc<Registry>> {
    if let Some(registry) = REGISTRY.get() {
        return Some(registry.clone());
    }
    match initialize(TraceConfig::defaults()) {
        Ok(registry) => Some(registry),
        Err(err) => {
            tracing::error!(
                target: "quill::registry",
                error = %err,
                "default initialization failed, handing out detached loggers",
            );
            None
        }
    }
}

// Convenience constructors for the common producer families.

/// Logger for a platform scraper (`scrapers/` category).
pub fn get_scraper_logger(platform: &str) -> Logger {
    get_logger(platform, Category::Scrapers)
}

/// Logger for a data processor (`processing/` category).
pub fn get_processing_logger(processor: &str) -> Logger {
    get_logger(processor, Category::Processing)
}

/// Logger for a storage component (`storage/` category).
pub fn get_storage_logger(store: &str) -> Logger {
    get_logger(store, Category::Storage)
}

// ---------------------------------------------------------------------------
// Scheduled sweeping
// ---------------------------------------------------------------------------

/// Run [`Registry::cleanup`] on a fixed period until the task is aborted.
/// The first sweep happens immediately.
pub fn spawn_retention_task(
    registry: Arc<Registry>,
    period: Duration,
    days_to_keep: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let report = registry.cleanup(days_to_keep);
            tracing::debug!(
                target: "quill::retention",
                scanned = report.scanned,
                deleted = report.deleted,
                failed = report.failed,
                "scheduled sweep finished",
            );
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
