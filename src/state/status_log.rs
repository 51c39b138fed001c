//! Per-day status logs.
//!
//! Every run appends a human-readable entry per market to a file named
//! after the execution date, so operators can scan what each scheduled run
//! did without structured log tooling.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use super::error::StateError;

/// Divider line between status entries.
const DIVIDER: &str =
    "####################################################################";

/// Formats one status entry for a market's feed fetch.
///
/// `timestamp` carries the time of day: several runs can append to the same
/// per-day file, so the date alone would not tell entries apart.
#[must_use]
pub fn format_status_entry(
    timestamp: NaiveDateTime,
    days_ago: i64,
    max_images: u32,
    market: &str,
    feed_url: &str,
    message: &str,
) -> String {
    let executed_at = timestamp.format("%Y-%m-%d %H:%M:%S");
    format!(
        "{DIVIDER}\n\
         DATE OF EXECUTION: {executed_at}\n\
         NO. OF PREVIOUS DAYS: {days_ago}\n\
         MAX. IMAGES TO DOWNLOAD: {max_images}\n\
         MARKET: {market}\n\
         ARCHIVE DATA URL: {feed_url}\n\
         STATUS: {message}\n"
    )
}

/// Appends status entries to a dated file in the logs directory.
#[derive(Debug, Clone)]
pub struct StatusLog {
    dir: PathBuf,
}

impl StatusLog {
    /// Creates a status log writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file path for a given execution date.
    #[must_use]
    pub fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("Status_{}.txt", date.format("%Y-%m-%d")))
    }

    /// The directory status files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends `entry` to the status file for `date`, creating the logs
    /// directory and file as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the directory or file cannot be written.
    pub fn append(&self, date: NaiveDate, entry: &str) -> Result<(), StateError> {
        fs::create_dir_all(&self.dir).map_err(|e| StateError::io(&self.dir, e))?;

        let path = self.file_path(date);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StateError::io(&path, e))?;
        file.write_all(entry.as_bytes())
            .map_err(|e| StateError::io(&path, e))?;
        debug!(path = %path.display(), "status entry appended");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    fn timestamp() -> NaiveDateTime {
        date().and_hms_opt(13, 5, 7).unwrap()
    }

    #[test]
    fn test_format_status_entry_labels_every_field() {
        let entry = format_status_entry(
            timestamp(),
            3,
            8,
            "en-US",
            "https://example.com/archive?idx=3",
            "No images XML data",
        );
        assert!(entry.starts_with(DIVIDER));
        assert!(entry.contains("DATE OF EXECUTION: 2026-08-30 13:05:07"));
        assert!(entry.contains("NO. OF PREVIOUS DAYS: 3"));
        assert!(entry.contains("MAX. IMAGES TO DOWNLOAD: 8"));
        assert!(entry.contains("MARKET: en-US"));
        assert!(entry.contains("ARCHIVE DATA URL: https://example.com/archive?idx=3"));
        assert!(entry.contains("STATUS: No images XML data"));
    }

    #[test]
    fn test_append_creates_dated_file_in_missing_directory() {
        let dir = TempDir::new().unwrap();
        let log = StatusLog::new(dir.path().join("logs"));

        log.append(date(), "first entry\n").unwrap();

        let contents = std::fs::read_to_string(log.file_path(date())).unwrap();
        assert_eq!(contents, "first entry\n");
        assert!(
            log.file_path(date())
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap()
                .eq("Status_2026-08-30.txt")
        );
    }

    #[test]
    fn test_append_accumulates_entries_in_order() {
        let dir = TempDir::new().unwrap();
        let log = StatusLog::new(dir.path());

        log.append(date(), "first\n").unwrap();
        log.append(date(), "second\n").unwrap();

        let contents = std::fs::read_to_string(log.file_path(date())).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
