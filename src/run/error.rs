//! Error type for the run orchestrator.

use std::path::PathBuf;

use thiserror::Error;

use crate::state::StateError;

/// Errors that abort a run.
///
/// Only state persistence and local file system problems abort; feed and
/// download failures are handled inside the run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Persisted state could not be read or written.
    #[error(transparent)]
    State(#[from] StateError),

    /// A local directory or file could not be created.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
