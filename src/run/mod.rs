//! Run orchestrator.
//!
//! Composes the feed client, image fetcher, and persisted state into one
//! sequential run: resolve the day offset from the progress cursor, fetch
//! each market's feed, download its images, record failures in the ledger,
//! advance the cursor, and optionally retry previously failed downloads.

mod error;

pub use error::RunError;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::download::{self, ImageFetcher};
use crate::feed::{ArchiveFeedClient, ImageRecord};
use crate::state::{
    LedgerStore, ProgressStore, StatusLog, XmlLedgerFile, XmlProgressFile, format_status_entry,
};

/// Status message recorded when a market's feed cannot be fetched or parsed.
const STATUS_FEED_FAILED: &str = "Could not load archive XML";

/// Status message recorded when a market's feed loads but lists no images.
const STATUS_FEED_EMPTY: &str = "No images XML data";

/// What a completed invocation did.
#[derive(Debug)]
pub enum RunSummary {
    /// The progress cursor already covers today; nothing was fetched.
    AlreadyUpToDate,
    /// The run executed; per-run counters and the optional retry pass
    /// outcome.
    Completed {
        /// Counters and failures from the main download pass.
        report: RunReport,
        /// Outcome of the retry pass, when one was configured.
        retry: Option<RetryReport>,
    },
}

/// Counters collected over one download pass, across all markets.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Images listed by the feeds (empty-URL entries excluded).
    pub total_files: usize,
    /// Images available locally afterwards, whether downloaded now or
    /// already present.
    pub files_downloaded: usize,
    /// Images whose retry budget was exhausted this run.
    pub failed: Vec<ImageRecord>,
    /// Status entries accumulated for the per-day status log.
    pub status_log: String,
}

/// Outcome of a retry pass over the failure ledger.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetryReport {
    /// Ledger entries that were retried.
    pub attempted: usize,
    /// Entries that succeeded this time and left the ledger.
    pub recovered: usize,
    /// Entries that failed again and stay in the ledger.
    pub still_failed: usize,
}

/// Sequential run orchestrator.
///
/// Generic over the ledger and progress stores so tests can substitute
/// in-memory implementations; production code uses the XML files.
#[derive(Debug)]
pub struct Orchestrator<L = XmlLedgerFile, P = XmlProgressFile> {
    config: Config,
    feed: ArchiveFeedClient,
    fetcher: ImageFetcher,
    status_log: StatusLog,
    ledger: L,
    progress: P,
}

impl Orchestrator {
    /// Builds an orchestrator with XML file stores at the configured paths.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        let client = download::http_client();
        let feed = ArchiveFeedClient::new(
            client.clone(),
            config.archive_url_template.clone(),
            config.max_images,
        );
        let fetcher = ImageFetcher::new(
            client,
            config.image_domain.clone(),
            config.root_dir.clone(),
            config.download_attempts,
        );
        let status_log = StatusLog::new(config.logs_dir.clone());
        let ledger = XmlLedgerFile::new(config.failed_downloads_file.clone());
        let progress = XmlProgressFile::new(config.progress_file.clone());
        Self::new(config, feed, fetcher, status_log, ledger, progress)
    }
}

impl<L: LedgerStore, P: ProgressStore> Orchestrator<L, P> {
    /// Builds an orchestrator from explicit parts.
    #[must_use]
    pub fn new(
        config: Config,
        feed: ArchiveFeedClient,
        fetcher: ImageFetcher,
        status_log: StatusLog,
        ledger: L,
        progress: P,
    ) -> Self {
        Self {
            config,
            feed,
            fetcher,
            status_log,
            ledger,
            progress,
        }
    }

    /// Executes one full run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when persisted state cannot be read or written,
    /// or the image directory cannot be created. Feed and download failures
    /// are not errors at this level; they land in the status log and the
    /// failure ledger.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let now = Local::now().naive_local();
        let today = now.date();

        let days_ago = if self.config.on_demand {
            self.config.days_ago
        } else {
            // No cursor yet means a first run: fetch today only.
            match self.progress.load()? {
                Some(last) => days_since(last, today),
                None => 0,
            }
        };

        if days_ago < 0 {
            info!("images already up to date, nothing to download");
            return Ok(RunSummary::AlreadyUpToDate);
        }

        std::fs::create_dir_all(&self.config.root_dir)
            .map_err(|e| RunError::io(&self.config.root_dir, e))?;
        std::fs::create_dir_all(&self.config.info_dir)
            .map_err(|e| RunError::io(&self.config.info_dir, e))?;

        let report = self.fetch_and_download(days_ago, now).await;

        if !report.failed.is_empty() {
            warn!(count = report.failed.len(), "recording failed downloads in ledger");
            self.ledger.append_all(&report.failed)?;
        }
        if !report.status_log.is_empty() {
            self.status_log.append(today, &report.status_log)?;
        }
        if report.total_files > 0 && report.files_downloaded > 0 {
            self.progress.save(today)?;
        }

        let retry = if self.config.retry_failed {
            Some(self.retry_failed_downloads().await?)
        } else {
            None
        };

        Ok(RunSummary::Completed { report, retry })
    }

    /// Fetches every configured market's feed for `days_ago` and downloads
    /// the listed images.
    #[instrument(skip(self))]
    async fn fetch_and_download(&self, days_ago: i64, now: NaiveDateTime) -> RunReport {
        let mut report = RunReport::default();

        for market in self.config.markets() {
            let feed_url = self.feed.feed_url(days_ago, market);

            let result = if self.config.on_demand {
                self.feed.fetch_latest_available(days_ago, market).await
            } else {
                self.feed.fetch(days_ago, market).await
            };

            let records = match result {
                Ok(records) => records,
                Err(err) => {
                    warn!(market, error = %err, "archive feed unavailable");
                    report.status_log.push_str(&format_status_entry(
                        now,
                        days_ago,
                        self.config.max_images,
                        market,
                        &feed_url,
                        STATUS_FEED_FAILED,
                    ));
                    continue;
                }
            };

            if records.is_empty() {
                info!(market, "archive feed lists no images");
                report.status_log.push_str(&format_status_entry(
                    now,
                    days_ago,
                    self.config.max_images,
                    market,
                    &feed_url,
                    STATUS_FEED_EMPTY,
                ));
                continue;
            }

            for record in records {
                if record.url.is_empty() {
                    continue;
                }
                report.total_files += 1;
                let status = self.fetcher.fetch_with_retries(&record).await;
                if status.is_success() {
                    report.files_downloaded += 1;
                } else {
                    report.failed.push(record);
                }
            }
        }

        info!(
            total = report.total_files,
            downloaded = report.files_downloaded,
            failed = report.failed.len(),
            "download pass finished"
        );
        report
    }

    /// Retries every ledger entry and rewrites the ledger with whatever
    /// still fails. Entries without a URL are dropped; they can never be
    /// fetched.
    #[instrument(skip(self))]
    async fn retry_failed_downloads(&self) -> Result<RetryReport, RunError> {
        let entries = self.ledger.load()?;
        if entries.is_empty() {
            info!("failure ledger is empty, nothing to retry");
            return Ok(RetryReport::default());
        }

        let mut report = RetryReport::default();
        let mut still_failed = Vec::new();

        for record in entries {
            if record.url.is_empty() {
                continue;
            }
            report.attempted += 1;
            if self.fetcher.fetch_with_retries(&record).await.is_success() {
                report.recovered += 1;
            } else {
                still_failed.push(record);
            }
        }

        report.still_failed = still_failed.len();
        self.ledger.replace_all(&still_failed)?;

        info!(
            attempted = report.attempted,
            recovered = report.recovered,
            still_failed = report.still_failed,
            "retry pass finished"
        );
        Ok(report)
    }
}

/// Day offset to fetch so the run resumes right after `last`.
///
/// Negative means `last` already covers today and there is nothing to do.
fn days_since(last: NaiveDate, today: NaiveDate) -> i64 {
    let resume_from = last.succ_opt().unwrap_or(last);
    (today - resume_from).num_days()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_since_yesterday_resumes_at_today() {
        assert_eq!(days_since(date(2026, 8, 29), date(2026, 8, 30)), 0);
    }

    #[test]
    fn test_days_since_week_old_cursor_reaches_back() {
        assert_eq!(days_since(date(2026, 8, 23), date(2026, 8, 30)), 6);
    }

    #[test]
    fn test_days_since_today_is_negative() {
        assert_eq!(days_since(date(2026, 8, 30), date(2026, 8, 30)), -1);
    }

    #[test]
    fn test_days_since_future_cursor_is_negative() {
        assert!(days_since(date(2026, 9, 5), date(2026, 8, 30)) < 0);
    }
}
