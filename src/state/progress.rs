//! Progress cursor: the last calendar date whose images were downloaded.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::error::StateError;
use super::xml::{element_text, xml_escape};

/// Date format used in the progress file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_ELEMENT: &str = "LastDownloadedDate";

/// Persistence for the progress cursor.
///
/// Implementations must treat an absent backing file as "no progress yet"
/// rather than an error, so a first run starts cleanly.
pub trait ProgressStore {
    /// Loads the last downloaded date, or `None` when no progress has been
    /// recorded yet.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the file exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<Option<NaiveDate>, StateError>;

    /// Persists `date` as the last downloaded date.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the file cannot be written.
    fn save(&self, date: NaiveDate) -> Result<(), StateError>;
}

/// Progress cursor stored as a small XML file holding a single element:
///
/// ```xml
/// <LastDownloadedDate>2026-08-29</LastDownloadedDate>
/// ```
#[derive(Debug, Clone)]
pub struct XmlProgressFile {
    path: PathBuf,
}

impl XmlProgressFile {
    /// Creates a progress store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for XmlProgressFile {
    fn load(&self) -> Result<Option<NaiveDate>, StateError> {
        let xml = match fs::read_to_string(&self.path) {
            Ok(xml) => xml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no progress file yet");
                return Ok(None);
            }
            Err(e) => return Err(StateError::io(&self.path, e)),
        };

        let Some(text) = element_text(&xml, DATE_ELEMENT)
            .map_err(|reason| StateError::parse(&self.path, reason))?
        else {
            return Ok(None);
        };

        let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map_err(|e| StateError::parse(&self.path, format!("invalid date {text:?}: {e}")))?;
        Ok(Some(date))
    }

    fn save(&self, date: NaiveDate) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::io(parent, e))?;
        }

        let formatted = date.format(DATE_FORMAT).to_string();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <{DATE_ELEMENT}>{}</{DATE_ELEMENT}>\n",
            xml_escape(&formatted)
        );
        fs::write(&self.path, xml).map_err(|e| StateError::io(&self.path, e))?;
        debug!(path = %self.path.display(), date = %formatted, "progress saved");
        Ok(())
    }
}
