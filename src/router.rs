//! Routing — category directory layout and sink resolution.
//!
//! The router owns one [`RotatingSink`] per file path, cached so that no
//! path is ever opened twice, and resolves a `(name, category)` pair into
//! the ordered [`RouteSet`] a logger writes through:
//!
//! ```text
//! trace/
//! ├── main.log                   ← Main (unscoped) loggers
//! ├── scrapers/
//! │   ├── general.log            ← every scrapers record
//! │   └── twitter.log            ← the "twitter" logger
//! ├── …one directory per category…
//! ├── errors/errors.log          ← every ERROR/CRITICAL record
//! ├── errors/exceptions.log      ← reported errors (condensed)
//! └── performance/metrics.log    ← every record carrying duration_ms
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use quill_core::{Category, RotationConfig};
use quill_sink::{RotatingSink, SinkError};

/// The sinks one logger fans records into, resolved once per logger name
/// and cached on the handle.
#[derive(Clone)]
pub struct RouteSet {
    /// Component file plus category general file (or `main.log` alone for
    /// `Main`). Never written twice for one record: entries are distinct.
    pub primary: Vec<Arc<RotatingSink>>,
    /// Receives every record at ERROR or above.
    pub errors: Option<Arc<RotatingSink>>,
    /// Receives condensed records from explicit error reports.
    pub exceptions: Option<Arc<RotatingSink>>,
    /// Receives a condensed `operation: Nms` line for every record that
    /// carries a duration.
    pub performance: Option<Arc<RotatingSink>>,
}

impl RouteSet {
    /// A route set that writes nowhere — the degraded fallback when the
    /// registry could not be constructed. Logging stays non-fatal.
    pub fn disabled() -> Self {
        Self {
            primary: Vec::new(),
            errors: None,
            exceptions: None,
            performance: None,
        }
    }
}

/// Read-only lookup table over sinks. Construction is the only phase that
/// mutates routing state; afterwards the router only hands out cached
/// `Arc`s (the per-path cache itself is append-only).
pub struct Router {
    root: PathBuf,
    rotation: RotationConfig,
    sinks: Mutex<HashMap<PathBuf, Arc<RotatingSink>>>,
    errors: Arc<RotatingSink>,
    exceptions: Arc<RotatingSink>,
    performance: Arc<RotatingSink>,
    main: Arc<RotatingSink>,
}

impl Router {
    /// Create the category tree and open the cross-cutting sinks.
    pub fn new(root: &Path, rotation: RotationConfig) -> Result<Self, SinkError> {
        let mut sinks = HashMap::new();
        let errors = open_cached(&mut sinks, root.join("errors").join("errors.log"), rotation)?;
        let exceptions =
            open_cached(&mut sinks, root.join("errors").join("exceptions.log"), rotation)?;
        let performance = open_cached(
            &mut sinks,
            root.join("performance").join("metrics.log"),
            rotation,
        )?;
        let main = open_cached(&mut sinks, root.join("main.log"), rotation)?;

        // The remaining category directories exist from initialization on,
        // even before any logger registers under them.
        for category in Category::scoped() {
            let dir = root.join(category.subdir().unwrap_or_default());
            std::fs::create_dir_all(&dir).map_err(|source| SinkError::CreateDir {
                path: dir,
                source,
            })?;
        }

        Ok(Self {
            root: root.to_path_buf(),
            rotation,
            sinks: Mutex::new(sinks),
            errors,
            exceptions,
            performance,
            main,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The ordered sinks for one logger. Infallible: a component file that
    /// cannot be opened is skipped (noted via `tracing`) and the logger
    /// still reaches the rest of its fan-out.
    pub fn resolve(&self, name: &str, category: Category) -> RouteSet {
        let mut primary = Vec::with_capacity(2);
        match category.subdir() {
            Some(dir) => {
                let component = self
                    .root
                    .join(dir)
                    .join(format!("{}.log", sanitize(name)));
                match self.sink(component) {
                    Ok(sink) => primary.push(sink),
                    Err(err) => tracing::warn!(
                        target: "quill::router",
                        logger = name,
                        error = %err,
                        "component sink unavailable, skipping",
                    ),
                }
                match self.sink(self.root.join(dir).join("general.log")) {
                    Ok(sink) => primary.push(sink),
                    Err(err) => tracing::warn!(
                        target: "quill::router",
                        logger = name,
                        error = %err,
                        "category general sink unavailable, falling back to main",
                    ),
                }
                if primary.is_empty() {
                    primary.push(self.main.clone());
                }
            }
            None => primary.push(self.main.clone()),
        }
        primary.dedup_by(|a, b| Arc::ptr_eq(a, b));

        RouteSet {
            primary,
            errors: Some(self.errors.clone()),
            exceptions: Some(self.exceptions.clone()),
            performance: Some(self.performance.clone()),
        }
    }

    /// Every path currently held open by a sink. The sweeper must never
    /// delete these.
    pub fn active_paths(&self) -> HashSet<PathBuf> {
        self.sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Total records dropped across all sinks after write retries.
    pub fn dropped_records(&self) -> u64 {
        self.sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|sink| sink.dropped_records())
            .sum()
    }

    fn sink(&self, path: PathBuf) -> Result<Arc<RotatingSink>, SinkError> {
        let mut sinks = self.sinks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sink) = sinks.get(&path) {
            return Ok(sink.clone());
        }
        let sink = Arc::new(RotatingSink::open(
            path.clone(),
            self.rotation.max_size_bytes,
            self.rotation.backup_count,
        )?);
        sinks.insert(path, sink.clone());
        Ok(sink)
    }
}

fn open_cached(
    sinks: &mut HashMap<PathBuf, Arc<RotatingSink>>,
    path: PathBuf,
    rotation: RotationConfig,
) -> Result<Arc<RotatingSink>, SinkError> {
    let sink = Arc::new(RotatingSink::open(
        path.clone(),
        rotation.max_size_bytes,
        rotation.backup_count,
    )?);
    sinks.insert(path, sink.clone());
    Ok(sink)
}

/// Logger names become file stems: lowercased, with anything outside
/// `[a-z0-9_-]` replaced by `_`.
fn sanitize(name: &str) -> String {
    let out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        "unnamed".to_string()
    } else {
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
