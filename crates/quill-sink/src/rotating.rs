//! RotatingSink — one append-only log file with size-based rotation.
//!
//! Rotation happens synchronously before the write that would exceed the
//! threshold: the active file is demoted to `<file>.1`, existing backups
//! shift `k → k+1`, and whatever would become backup `backup_count + 1` is
//! deleted. A record is either fully written before a rotation or fully
//! written to the fresh file after it — never split.
//!
//! Writes never return errors to producers. A failed write gets one
//! reopen-and-retry; after that the record is dropped from this sink only,
//! the drop counter is bumped, and a `tracing` event notes the failure
//! (a no-op unless the host process installed a subscriber).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Failure while opening a sink. The write path is infallible by contract;
/// only construction returns errors.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create log directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open log file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single rotating output file plus its size/backup bookkeeping.
pub struct RotatingSink {
    path: PathBuf,
    max_size_bytes: u64,
    backup_count: usize,
    state: Mutex<SinkState>,
    dropped: AtomicU64,
}

struct SinkState {
    file: File,
    size: u64,
}

impl RotatingSink {
    /// Open (creating parent directories and the file as needed) in append
    /// mode. `max_size_bytes = 0` disables rotation.
    pub fn open(
        path: impl Into<PathBuf>,
        max_size_bytes: u64,
        backup_count: usize,
    ) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SinkError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let file = open_append(&path).map_err(|source| SinkError::Open {
            path: path.clone(),
            source,
        })?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            max_size_bytes,
            backup_count,
            state: Mutex::new(SinkState { file, size }),
            dropped: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records dropped by this sink after the retry was exhausted.
    pub fn dropped_records(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Append one formatted record. Rotates first when this write would
    /// push the active file past the threshold; a record larger than the
    /// threshold on its own still rotates and is then written whole.
    pub fn write(&self, bytes: &[u8]) {
        // A producer that panicked mid-write elsewhere must not kill
        // logging for everyone: recover the poisoned state and keep going.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if self.max_size_bytes > 0 && state.size + bytes.len() as u64 > self.max_size_bytes {
            if let Err(err) = self.rotate(&mut state) {
                tracing::warn!(
                    target: "quill::sink",
                    path = %self.path.display(),
                    error = %err,
                    "rotation failed, continuing on the current file",
                );
            }
        }

        if append(&mut state, bytes).is_ok() {
            return;
        }

        // One reopen-and-retry, then the record is dropped from this sink
        // only; the rest of the fan-out is unaffected.
        let retried = open_append(&self.path).and_then(|file| {
            state.size = file.metadata().map(|m| m.len()).unwrap_or(0);
            state.file = file;
            append(&mut state, bytes)
        });
        if let Err(err) = retried {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                target: "quill::sink",
                path = %self.path.display(),
                error = %err,
                "write failed after retry, record dropped from this sink",
            );
        }
    }

    /// Demote the active file to `.1`, shift backups upward, reopen fresh.
    /// Caller holds the state lock, so rotation is atomic for writers.
    fn rotate(&self, state: &mut SinkState) -> io::Result<()> {
        if self.backup_count > 0 {
            let oldest = backup_path(&self.path, self.backup_count);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for k in (1..self.backup_count).rev() {
                let from = backup_path(&self.path, k);
                if from.exists() {
                    fs::rename(&from, backup_path(&self.path, k + 1))?;
                }
            }
            fs::rename(&self.path, backup_path(&self.path, 1))?;
        } else {
            fs::remove_file(&self.path)?;
        }
        state.file = open_append(&self.path)?;
        state.size = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn append(state: &mut SinkState, bytes: &[u8]) -> io::Result<()> {
    state.file.write_all(bytes)?;
    state.file.flush()?;
    state.size += bytes.len() as u64;
    Ok(())
}

/// `twitter.log` + `2` → `twitter.log.2`.
fn backup_path(path: &Path, k: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{k}"));
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
