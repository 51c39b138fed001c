//! Configuration file loading.
//!
//! The archiver is driven by a single JSON config file covering directory
//! layout, the archive feed URL template, the market list, and the retry
//! knobs. Everything operational lives here; the CLI only selects the file
//! and the log level.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::download::DEFAULT_DOWNLOAD_ATTEMPTS;

/// Default number of images requested per feed fetch.
pub const DEFAULT_MAX_IMAGES: u32 = 8;

/// Archiver configuration, deserialized from a JSON file.
///
/// The URL template uses `{days_ago}`, `{max_images}` and `{market}`
/// placeholders, substituted per fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory where downloaded images are stored.
    pub root_dir: PathBuf,

    /// Directory holding the progress and ledger files.
    pub info_dir: PathBuf,

    /// Path of the progress file (last successful download date).
    pub progress_file: PathBuf,

    /// Path of the failed-downloads ledger file.
    pub failed_downloads_file: PathBuf,

    /// Directory for per-day status log files.
    pub logs_dir: PathBuf,

    /// Archive feed URL template with `{days_ago}`, `{max_images}` and
    /// `{market}` placeholders.
    pub archive_url_template: String,

    /// Origin the image paths from the feed are resolved against.
    pub image_domain: String,

    /// Comma-separated list of market codes (e.g. `en-US,fr-FR`).
    pub markets: String,

    /// Maximum images requested per feed fetch.
    #[serde(default = "default_max_images")]
    pub max_images: u32,

    /// Download attempts per image before it is recorded as failed.
    #[serde(default = "default_download_attempts")]
    pub download_attempts: u32,

    /// On-demand mode: fetch a fixed day offset instead of resuming from
    /// the progress cursor.
    #[serde(default)]
    pub on_demand: bool,

    /// Fixed day offset used in on-demand mode.
    #[serde(default)]
    pub days_ago: i64,

    /// Whether to run the retry pass over the ledger after the main run.
    #[serde(default)]
    pub retry_failed: bool,
}

fn default_max_images() -> u32 {
    DEFAULT_MAX_IMAGES
}

fn default_download_attempts() -> u32 {
    DEFAULT_DOWNLOAD_ATTEMPTS
}

impl Config {
    /// Loads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid JSON for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the configured markets, trimmed, with empty entries dropped.
    #[must_use]
    pub fn markets(&self) -> Vec<&str> {
        self.markets
            .split(',')
            .map(str::trim)
            .filter(|market| !market.is_empty())
            .collect()
    }
}

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected schema.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn minimal_json() -> &'static str {
        r#"{
            "root_dir": "/data/images",
            "info_dir": "/data/info",
            "progress_file": "/data/info/Status.xml",
            "failed_downloads_file": "/data/info/FailedDownloads.xml",
            "logs_dir": "/data/logs",
            "archive_url_template": "https://example.com/archive?idx={days_ago}&n={max_images}&mkt={market}",
            "image_domain": "https://example.com",
            "markets": "en-US, fr-FR,,de-DE"
        }"#
    }

    #[test]
    fn test_config_load_minimal_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, minimal_json()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_images, DEFAULT_MAX_IMAGES);
        assert_eq!(config.download_attempts, DEFAULT_DOWNLOAD_ATTEMPTS);
        assert!(!config.on_demand);
        assert_eq!(config.days_ago, 0);
        assert!(!config.retry_failed);
    }

    #[test]
    fn test_config_markets_trims_and_drops_empty_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, minimal_json()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.markets(), vec!["en-US", "fr-FR", "de-DE"]);
    }

    #[test]
    fn test_config_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_config_load_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let json = minimal_json().replacen('{', r#"{ "bogus": 1,"#, 1);
        std::fs::write(&path, json).unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
