//! Archival sinks for discovery results.
//!
//! A sink persists the per-run connectivity report and per-device
//! configuration snapshots. Exact file naming is an implementation detail
//! of the sink, not a contract of the discovery pass.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;

use crate::error::ArchiveError;

/// Durable storage for discovery results.
pub trait ArchiveSink {
    /// Append one dated connectivity report, one line per observed
    /// adjacency, grouped per reporting device by the caller.
    fn append_connectivity_report(
        &mut self,
        timestamp: DateTime<Local>,
        lines: &[String],
    ) -> Result<(), ArchiveError>;

    /// Persist one device's configuration dump.
    fn write_config_snapshot(&mut self, device_key: &str, text: &str) -> Result<(), ArchiveError>;
}

/// Filesystem-backed archive.
///
/// Connectivity reports are appended to `interconnectivity.txt` under the
/// root; configuration snapshots land in a per-run stamped directory,
/// one file per device.
pub struct FsArchive {
    root: PathBuf,
    snapshot_dir: PathBuf,
}

impl FsArchive {
    /// Create an archive rooted at `root`, stamping this run's snapshot
    /// directory with the current local time.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_run_time(root, Local::now())
    }

    /// Create an archive with an explicit run time (tests).
    pub fn with_run_time(root: impl Into<PathBuf>, run_time: DateTime<Local>) -> Self {
        let root = root.into();
        let snapshot_dir = root
            .join("configs")
            .join(run_time.format("%Y-%m-%d_%H%M").to_string());
        Self { root, snapshot_dir }
    }

    /// The directory this run's config snapshots are written to.
    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    fn ensure_dir(path: &Path) -> Result<(), ArchiveError> {
        fs::create_dir_all(path).map_err(|source| ArchiveError::CreateDir {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ArchiveSink for FsArchive {
    fn append_connectivity_report(
        &mut self,
        timestamp: DateTime<Local>,
        lines: &[String],
    ) -> Result<(), ArchiveError> {
        Self::ensure_dir(&self.root)?;

        let path = self.root.join("interconnectivity.txt");

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| write_err(&path, e))?;

        writeln!(file, "{}", timestamp.format("%Y-%m-%d")).map_err(|e| write_err(&path, e))?;
        for line in lines {
            writeln!(file, "{line}").map_err(|e| write_err(&path, e))?;
        }

        info!("appended connectivity report to {}", path.display());
        Ok(())
    }

    fn write_config_snapshot(&mut self, device_key: &str, text: &str) -> Result<(), ArchiveError> {
        Self::ensure_dir(&self.snapshot_dir)?;

        let path = self.snapshot_dir.join(format!("{device_key}.txt"));
        fs::write(&path, text).map_err(|e| write_err(&path, e))?;

        info!("wrote config snapshot {}", path.display());
        Ok(())
    }
}

fn write_err(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Write {
        path: path.display().to_string(),
        source,
    }
}

/// Archive that discards everything. For tests and render-only runs.
#[derive(Debug, Default)]
pub struct NullArchive;

impl ArchiveSink for NullArchive {
    fn append_connectivity_report(
        &mut self,
        _timestamp: DateTime<Local>,
        _lines: &[String],
    ) -> Result<(), ArchiveError> {
        Ok(())
    }

    fn write_config_snapshot(&mut self, _device_key: &str, _text: &str) -> Result<(), ArchiveError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_connectivity_report_appends() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = FsArchive::with_run_time(dir.path(), run_time());

        archive
            .append_connectivity_report(run_time(), &["Neighbors for r1".to_string()])
            .unwrap();
        archive
            .append_connectivity_report(run_time(), &["Neighbors for r2".to_string()])
            .unwrap();

        let text = fs::read_to_string(dir.path().join("interconnectivity.txt")).unwrap();
        assert_eq!(text.matches("2024-03-01").count(), 2);
        assert!(text.contains("Neighbors for r1"));
        assert!(text.contains("Neighbors for r2"));
    }

    #[test]
    fn test_config_snapshot_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = FsArchive::with_run_time(dir.path(), run_time());

        archive
            .write_config_snapshot("core-sw1", "hostname core-sw1\n")
            .unwrap();

        let path = dir
            .path()
            .join("configs")
            .join("2024-03-01_1430")
            .join("core-sw1.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "hostname core-sw1\n");
    }
}
