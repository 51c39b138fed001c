//! Image fetcher with bounded per-image retries.
//!
//! Downloads one image at a time to a name derived from its description.
//! A file that already exists under that name counts as downloaded, so
//! re-running over the same feed entries performs no network calls.

mod error;
mod filename;

pub use error::DownloadError;
pub use filename::{ImageExt, MAX_STEM_LEN, derive_file_name, normalize_image_url};

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::feed::ImageRecord;

/// Default download attempts per image.
pub const DEFAULT_DOWNLOAD_ATTEMPTS: u32 = 3;

/// Connect timeout for all HTTP requests.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Read timeout for all HTTP requests.
const READ_TIMEOUT_SECS: u64 = 120;

/// Builds the HTTP client shared by the feed client and the image fetcher.
///
/// # Panics
///
/// Panics if the HTTP client builder fails to build with the static
/// configuration. This should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .gzip(true)
        .build()
        .expect("failed to build HTTP client with static configuration")
}

/// How a single successful fetch was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The image was downloaded over the network.
    Downloaded,
    /// A file with the derived name already existed; no network call made.
    AlreadyPresent,
}

/// Terminal status of a fetch after the retry budget is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Downloaded over the network on some attempt.
    Downloaded,
    /// Already present locally; no network call made.
    AlreadyPresent,
    /// All attempts failed; the record belongs in the failure ledger.
    Failed,
}

impl FetchStatus {
    /// True when the image is available locally after the call.
    #[must_use]
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Downloads feed images into a target directory.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    domain: String,
    output_dir: PathBuf,
    max_attempts: u32,
}

impl ImageFetcher {
    /// Creates a fetcher resolving feed paths against `domain` and writing
    /// into `output_dir`, with at most `max_attempts` tries per image
    /// (clamped to at least 1).
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        domain: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        max_attempts: u32,
    ) -> Self {
        Self {
            client,
            domain: domain.into(),
            output_dir: output_dir.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    /// The path the given record would be stored at, if its URL is
    /// well-formed.
    #[must_use]
    pub fn target_path(&self, record: &ImageRecord) -> Option<PathBuf> {
        let (_, ext) = normalize_image_url(&record.url)?;
        Some(self.output_dir.join(derive_file_name(&record.description, ext)))
    }

    /// Performs a single download attempt for `record`.
    ///
    /// If the target file already exists the attempt succeeds with
    /// [`FetchOutcome::AlreadyPresent`] and no network call is made.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::MalformedUrl`] (before any network call) if
    /// the URL has no recognizable extension, and network/HTTP/IO errors
    /// for a failed transfer. The partial file is removed on write failure.
    #[instrument(skip(self), fields(url = %record.url))]
    pub async fn fetch(&self, record: &ImageRecord) -> Result<FetchOutcome, DownloadError> {
        let (normalized, ext) = normalize_image_url(&record.url)
            .ok_or_else(|| DownloadError::malformed_url(&record.url))?;

        let file_name = derive_file_name(&record.description, ext);
        let target = self.output_dir.join(&file_name);

        if tokio::fs::metadata(&target).await.is_ok() {
            debug!(path = %target.display(), "image already present, skipping download");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        let url = format!(
            "{}/{}",
            self.domain.trim_end_matches('/'),
            normalized.trim_start_matches('/')
        );
        debug!(url = %url, path = %target.display(), "downloading image");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DownloadError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(&url, status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(&url, e))?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| DownloadError::io(&self.output_dir, e))?;

        if let Err(e) = tokio::fs::write(&target, &bytes).await {
            // Don't leave half-written image files behind.
            let _ = tokio::fs::remove_file(&target).await;
            return Err(DownloadError::io(&target, e));
        }

        debug!(path = %target.display(), bytes = bytes.len(), "image downloaded");
        Ok(FetchOutcome::Downloaded)
    }

    /// Fetches `record` with the bounded retry budget.
    ///
    /// The attempt counter starts fresh for every record. (The program this
    /// replaces shared one counter across the whole run, which starved all
    /// but the first images of their retry budget.)
    ///
    /// Never returns an error: exhaustion and malformed URLs both resolve
    /// to [`FetchStatus::Failed`], which the caller records in the ledger.
    pub async fn fetch_with_retries(&self, record: &ImageRecord) -> FetchStatus {
        for attempt in 1..=self.max_attempts {
            match self.fetch(record).await {
                Ok(FetchOutcome::Downloaded) => return FetchStatus::Downloaded,
                Ok(FetchOutcome::AlreadyPresent) => return FetchStatus::AlreadyPresent,
                Err(err @ DownloadError::MalformedUrl { .. }) => {
                    // Retrying cannot help; no attempt ever reaches the network.
                    warn!(error = %err, "image skipped");
                    return FetchStatus::Failed;
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        url = %record.url,
                        error = %err,
                        "image download attempt failed"
                    );
                }
            }
        }
        FetchStatus::Failed
    }

    /// The directory images are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
