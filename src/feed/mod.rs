//! Archive feed client.
//!
//! Fetches the dated, market-specific archive XML and extracts the image
//! list. Two modes exist: scheduled fetches hit exactly one URL per
//! `(days_ago, max_images, market)` tuple, while on-demand fetches walk the
//! day offset down towards zero until a feed loads, because some markets
//! have no feed entry for older offsets.

mod error;

pub use error::FeedError;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, instrument};

/// A single image referenced by the archive feed.
///
/// Produced by the feed client or read back from the failure ledger;
/// immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRecord {
    /// Image URL as listed in the feed (relative path, possibly with
    /// trailing garbage after the real extension).
    pub url: String,
    /// Copyright/description text; the local file name is derived from it.
    pub description: String,
}

impl ImageRecord {
    /// Creates a new image record.
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
        }
    }
}

/// Client for the daily image archive feed.
#[derive(Debug, Clone)]
pub struct ArchiveFeedClient {
    client: reqwest::Client,
    url_template: String,
    max_images: u32,
}

impl ArchiveFeedClient {
    /// Creates a feed client over an existing HTTP client.
    ///
    /// `url_template` must contain `{days_ago}`, `{max_images}` and
    /// `{market}` placeholders.
    #[must_use]
    pub fn new(client: reqwest::Client, url_template: impl Into<String>, max_images: u32) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            max_images,
        }
    }

    /// Renders the feed URL for a day offset and market.
    #[must_use]
    pub fn feed_url(&self, days_ago: i64, market: &str) -> String {
        self.url_template
            .replace("{days_ago}", &days_ago.to_string())
            .replace("{max_images}", &self.max_images.to_string())
            .replace("{market}", market)
    }

    /// Fetches and parses the feed for an exact day offset (scheduled mode).
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] on network failure, a non-success HTTP status,
    /// or a malformed feed body.
    #[instrument(skip(self))]
    pub async fn fetch(&self, days_ago: i64, market: &str) -> Result<Vec<ImageRecord>, FeedError> {
        let url = self.feed_url(days_ago, market);
        debug!(url = %url, "fetching archive feed");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::http_status(&url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::network(&url, e))?;

        let records = parse_archive_xml(&body).map_err(|reason| FeedError::parse(&url, reason))?;
        debug!(market, count = records.len(), "archive feed parsed");
        Ok(records)
    }

    /// Fetches the feed in on-demand mode: starts at `days_ago` and walks
    /// the offset down to zero, returning the first feed that loads.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Exhausted`] if no offset down to zero yields a
    /// loadable feed.
    #[instrument(skip(self))]
    pub async fn fetch_latest_available(
        &self,
        days_ago: i64,
        market: &str,
    ) -> Result<Vec<ImageRecord>, FeedError> {
        let mut offset = days_ago.max(0);
        loop {
            match self.fetch(offset, market).await {
                Ok(records) => {
                    if offset != days_ago {
                        debug!(market, requested = days_ago, offset, "feed found at lower offset");
                    }
                    return Ok(records);
                }
                Err(err) => {
                    debug!(market, offset, error = %err, "feed unavailable at offset");
                    if offset == 0 {
                        return Err(FeedError::exhausted(market, days_ago));
                    }
                    offset -= 1;
                }
            }
        }
    }
}

/// Which child of an `image` element is currently being read.
enum ImageField {
    Url,
    Description,
}

/// Extracts image records from archive XML.
///
/// The feed schema is external and fixed: repeated `image` elements with
/// `url` and `copyright` children. Unknown elements are ignored; an `image`
/// missing either child yields a record with the corresponding field empty
/// (the orchestrator skips empty-URL records).
fn parse_archive_xml(xml: &str) -> Result<Vec<ImageRecord>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut in_image = false;
    let mut field: Option<ImageField> = None;
    let mut url = String::new();
    let mut description = String::new();

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => match e.name().as_ref() {
                b"image" => {
                    in_image = true;
                    url.clear();
                    description.clear();
                }
                b"url" if in_image => field = Some(ImageField::Url),
                b"copyright" if in_image => field = Some(ImageField::Description),
                _ => field = None,
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                match field {
                    Some(ImageField::Url) => url.push_str(&text),
                    Some(ImageField::Description) => description.push_str(&text),
                    None => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"image" => {
                    in_image = false;
                    records.push(ImageRecord::new(url.clone(), description.clone()));
                }
                b"url" | b"copyright" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}
