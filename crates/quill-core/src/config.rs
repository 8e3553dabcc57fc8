//! Configuration types for quill.
//!
//! [`TraceConfig::load`] layers an optional `quill.toml` in the working
//! directory on top of the built-in defaults. [`TraceConfig::defaults`]
//! returns the same defaults without touching the filesystem (useful in
//! tests, and what the registry falls back to when nothing was configured).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::format::FormatMode;
use crate::types::Level;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
root   = "trace"
level  = "INFO"
format = "line"

[rotation]
max_size_bytes = 10485760
backup_count   = 5

[retention]
days = 7
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level logging configuration, loaded from `./quill.toml` when present.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceConfig {
    /// Root directory the category tree is created under.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Minimum severity accepted by every logger handle created afterward.
    #[serde(default = "default_level")]
    pub level: Level,
    /// Wire format, applied process-wide.
    #[serde(default = "default_format")]
    pub format: FormatMode,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// `[rotation]` section of `quill.toml`, applied to every sink.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RotationConfig {
    /// Rotation threshold in bytes. `0` disables rotation.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
    /// Retained rotated generations per sink.
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
}

/// `[retention]` section of `quill.toml`, consumed by the sweeper.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetentionConfig {
    /// Age threshold in days for deleting rotated and idle log files.
    #[serde(default = "default_retention_days")]
    pub days: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from("trace")
}
fn default_level() -> Level {
    Level::Info
}
fn default_format() -> FormatMode {
    FormatMode::Line
}
fn default_max_size_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_backup_count() -> usize {
    5
}
fn default_retention_days() -> u64 {
    7
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            backup_count: default_backup_count(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_retention_days(),
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl TraceConfig {
    /// Load from `./quill.toml`, layered on top of the built-in defaults.
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("quill.toml"))
    }

    /// Load from an explicit path, layered on top of the built-in defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    // Builder-style overrides, mostly for tests and the demo binary.

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: FormatMode) -> Self {
        self.format = format;
        self
    }

    pub fn with_rotation(mut self, max_size_bytes: u64, backup_count: usize) -> Self {
        self.rotation = RotationConfig {
            max_size_bytes,
            backup_count,
        };
        self
    }

    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention = RetentionConfig { days };
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
    fn defaults_load() {
        let cfg = TraceConfig::defaults();
        assert_eq!(cfg.root, PathBuf::from("trace"));
        assert_eq!(cfg.level, Level::Info);
        assert_eq!(cfg.format, FormatMode::Line);
        assert_eq!(cfg.rotation.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.rotation.backup_count, 5);
        assert_eq!(cfg.retention.days, 7);
    }

    #[test]
    fn file_overlay_beats_defaults() {
        let dir = std::env::temp_dir().join("quill-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quill.toml");
        std::fs::write(
            &path,
            "level = \"ERROR\"\nformat = \"json\"\n[rotation]\nbackup_count = 2\n",
        )
        .unwrap();

        let cfg = TraceConfig::load_from(&path).unwrap();
        assert_eq!(cfg.level, Level::Error);
        assert_eq!(cfg.format, FormatMode::Json);
        assert_eq!(cfg.rotation.backup_count, 2);
        // Untouched keys keep their defaults.
        assert_eq!(cfg.rotation.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.retention.days, 7);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_overlay_is_not_an_error() {
        let cfg = TraceConfig::load_from(Path::new("/nonexistent/quill.toml")).unwrap();
        assert_eq!(cfg.level, Level::Info);
    }
}
