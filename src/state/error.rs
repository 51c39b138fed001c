//! Error types for persisted run state.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading or writing the progress cursor, failure ledger, or status
/// logs.
#[derive(Debug, Error)]
pub enum StateError {
    /// File system error touching a state file.
    #[error("IO error on state file {path}: {source}")]
    Io {
        /// The state file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A state file exists but its contents could not be understood.
    #[error("cannot parse state file {path}: {reason}")]
    Parse {
        /// The state file path.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },
}

impl StateError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = StateError::io(PathBuf::from("/tmp/progress.xml"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/progress.xml"), "Expected path in: {msg}");
    }

    #[test]
    fn test_state_error_parse_display() {
        let error = StateError::parse(PathBuf::from("/tmp/failed.xml"), "unexpected EOF");
        let msg = error.to_string();
        assert!(msg.contains("unexpected EOF"), "Expected reason in: {msg}");
    }
}
