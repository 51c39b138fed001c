//! Bing Daily Image Archiver
//!
//! This library fetches the daily image-archive XML feed for a set of
//! regional markets, downloads the referenced images to local storage, and
//! tracks download state across runs so the next invocation resumes where
//! the last successful one left off.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Configuration file loading
//! - [`feed`] - Archive feed client (XML fetch + parse)
//! - [`download`] - Image fetcher with bounded per-image retries
//! - [`state`] - Failure ledger, progress cursor, and status log persistence
//! - [`run`] - The sequential run orchestrator composing the above

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod feed;
pub mod run;
pub mod state;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use download::{
    DEFAULT_DOWNLOAD_ATTEMPTS, DownloadError, FetchOutcome, FetchStatus, ImageExt, ImageFetcher,
    derive_file_name, normalize_image_url,
};
pub use feed::{ArchiveFeedClient, FeedError, ImageRecord};
pub use run::{Orchestrator, RetryReport, RunError, RunReport, RunSummary};
pub use state::{
    LedgerStore, ProgressStore, StateError, StatusLog, XmlLedgerFile, XmlProgressFile,
};
