//! Error types for the archive feed client.

use thiserror::Error;

/// Errors that can occur fetching or parsing the archive feed.
///
/// All variants are recovered per-market by the orchestrator: a failed feed
/// produces a status-log entry and the run moves on to the next market.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network-level error fetching the feed (DNS, connection, TLS, timeout).
    #[error("network error fetching feed {url}: {source}")]
    Network {
        /// The feed URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The feed endpoint returned a non-success HTTP status.
    #[error("HTTP {status} fetching feed {url}")]
    HttpStatus {
        /// The feed URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The feed body was not well-formed archive XML.
    #[error("cannot parse feed {url}: {reason}")]
    Parse {
        /// The feed URL whose body failed to parse.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// On-demand mode walked every offset down to zero without finding a
    /// loadable feed for the market.
    #[error("no archive feed available for market {market} within {from_days_ago} days")]
    Exhausted {
        /// The market that had no loadable feed.
        market: String,
        /// The day offset the walk started from.
        from_days_ago: i64,
    },
}

impl FeedError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a parse error.
    pub fn parse(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an exhausted-offsets error.
    pub fn exhausted(market: impl Into<String>, from_days_ago: i64) -> Self {
        Self::Exhausted {
            market: market.into(),
            from_days_ago,
        }
    }
}
