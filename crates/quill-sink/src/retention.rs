//! Retention sweeping — age-based cleanup of log files.
//!
//! The sweeper walks the trace root, matching base files (`*.log`) and
//! rotated backups (`*.log.N`) by name, and deletes those whose modified
//! time falls before the cutoff. Files named in the active set — every
//! path some sink currently holds open — are never deleted, however old:
//! an idle but open sink is not aged out.
//!
//! The sweep holds no lock writers depend on and inspects nothing but
//! directory metadata, so it is safe to run concurrently with producers.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Log files considered (name matched the pattern).
    pub scanned: usize,
    /// Files deleted this run.
    pub deleted: usize,
    /// Deletions that failed; each is noted via `tracing` and skipped.
    pub failed: usize,
}

/// Delete every non-active log file under `root` modified before `cutoff`.
/// Idempotent: a second run with no new writes deletes nothing.
pub fn sweep(root: &Path, cutoff: SystemTime, active: &HashSet<PathBuf>) -> SweepReport {
    let mut report = SweepReport::default();
    sweep_dir(root, cutoff, active, &mut report);
    report
}

fn sweep_dir(dir: &Path, cutoff: SystemTime, active: &HashSet<PathBuf>, report: &mut SweepReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(
                target: "quill::retention",
                path = %dir.display(),
                error = %err,
                "cannot read directory, skipping",
            );
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            sweep_dir(&path, cutoff, active, report);
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_log_artifact(name) {
            continue;
        }
        report.scanned += 1;
        if active.contains(&path) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if modified >= cutoff {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => report.deleted += 1,
            Err(err) => {
                report.failed += 1;
                tracing::warn!(
                    target: "quill::retention",
                    path = %path.display(),
                    error = %err,
                    "failed to delete aged log file",
                );
            }
        }
    }
}

/// `app.log` and `app.log.3` qualify; `app.txt` and `app.log.bak` do not.
fn is_log_artifact(name: &str) -> bool {
    if name.ends_with(".log") {
        return true;
    }
    match name.rsplit_once('.') {
        Some((stem, suffix)) => {
            stem.ends_with(".log")
                && !suffix.is_empty()
                && suffix.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn touch(path: &Path) {
        fs::write(path, b"old content\n").unwrap();
    }

    fn future_cutoff() -> SystemTime {
        SystemTime::now() + Duration::from_secs(3600)
    }

    #[test]
    fn log_artifact_names() {
        assert!(is_log_artifact("general.log"));
        assert!(is_log_artifact("twitter.log.1"));
        assert!(is_log_artifact("metrics.log.12"));
        assert!(!is_log_artifact("notes.txt"));
        assert!(!is_log_artifact("twitter.log.bak"));
        assert!(!is_log_artifact("twitter.log."));
        assert!(!is_log_artifact("log"));
    }

    #[test]
    fn deletes_aged_files_but_never_active_ones() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("scrapers");
        fs::create_dir_all(&sub).unwrap();

        let active_file = sub.join("twitter.log");
        let backup = sub.join("twitter.log.1");
        let idle = sub.join("youtube.log");
        let unrelated = sub.join("notes.txt");
        for path in [&active_file, &backup, &idle, &unrelated] {
            touch(path);
        }

        let active = HashSet::from([active_file.clone()]);
        let report = sweep(dir.path(), future_cutoff(), &active);

        assert_eq!(report.scanned, 3);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.failed, 0);
        assert!(active_file.exists(), "active sink file must survive");
        assert!(!backup.exists());
        assert!(!idle.exists());
        assert!(unrelated.exists(), "non-log files are out of scope");
    }

    #[test]
    fn recent_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fresh.log");
        touch(&file);

        let cutoff = SystemTime::now() - Duration::from_secs(3600);
        let report = sweep(dir.path(), cutoff, &HashSet::new());

        assert_eq!(report.deleted, 0);
        assert!(file.exists());
    }

    #[test]
    fn second_sweep_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.log"));
        touch(&dir.path().join("a.log.1"));

        let first = sweep(dir.path(), future_cutoff(), &HashSet::new());
        let second = sweep(dir.path(), future_cutoff(), &HashSet::new());

        assert_eq!(first.deleted, 2);
        assert_eq!(second.deleted, 0);
        assert_eq!(second.scanned, 0);
    }

    #[test]
    fn missing_root_is_a_clean_no_op() {
        let report = sweep(
            Path::new("/definitely/not/a/real/trace/root"),
            future_cutoff(),
            &HashSet::new(),
        );
        assert_eq!(report, SweepReport::default());
    }
}
