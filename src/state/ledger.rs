//! Failure ledger: images whose downloads exhausted their retry budget.
//!
//! The ledger survives across runs so a later retry pass can recover
//! transient failures. A regular run appends its new failures; the retry
//! pass replaces the whole ledger with whatever still fails.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::feed::ImageRecord;

use super::error::StateError;
use super::xml::xml_escape;

/// Persistence for the failure ledger.
pub trait LedgerStore {
    /// Loads all ledger entries, oldest first. An absent backing file is an
    /// empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the file exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<Vec<ImageRecord>, StateError>;

    /// Appends `records` to the ledger, dropping any whose URL is already
    /// present (first occurrence wins).
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the ledger cannot be read or written.
    fn append_all(&self, records: &[ImageRecord]) -> Result<(), StateError>;

    /// Replaces the whole ledger with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the ledger cannot be written.
    fn replace_all(&self, records: &[ImageRecord]) -> Result<(), StateError>;
}

/// Failure ledger stored as an XML file.
///
/// ```xml
/// <FailedDownloads>
///   <Image>
///     <URL>/th?id=OHR.Example.jpg</URL>
///     <Description>Example (Photographer)</Description>
///   </Image>
/// </FailedDownloads>
/// ```
#[derive(Debug, Clone)]
pub struct XmlLedgerFile {
    path: PathBuf,
}

impl XmlLedgerFile {
    /// Creates a ledger store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[ImageRecord]) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::io(parent, e))?;
        }

        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<FailedDownloads>\n");
        for record in records {
            xml.push_str("  <Image>\n");
            xml.push_str(&format!("    <URL>{}</URL>\n", xml_escape(&record.url)));
            xml.push_str(&format!(
                "    <Description>{}</Description>\n",
                xml_escape(&record.description)
            ));
            xml.push_str("  </Image>\n");
        }
        xml.push_str("</FailedDownloads>\n");

        fs::write(&self.path, xml).map_err(|e| StateError::io(&self.path, e))?;
        debug!(path = %self.path.display(), count = records.len(), "failure ledger written");
        Ok(())
    }
}

impl LedgerStore for XmlLedgerFile {
    fn load(&self) -> Result<Vec<ImageRecord>, StateError> {
        let xml = match fs::read_to_string(&self.path) {
            Ok(xml) => xml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no failure ledger yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StateError::io(&self.path, e)),
        };

        parse_ledger_xml(&xml).map_err(|reason| StateError::parse(&self.path, reason))
    }

    fn append_all(&self, records: &[ImageRecord]) -> Result<(), StateError> {
        let mut merged = self.load()?;
        for record in records {
            if !merged.iter().any(|existing| existing.url == record.url) {
                merged.push(record.clone());
            }
        }
        self.write(&merged)
    }

    fn replace_all(&self, records: &[ImageRecord]) -> Result<(), StateError> {
        self.write(records)
    }
}

/// Which child of an `Image` element is currently being read.
enum LedgerField {
    Url,
    Description,
}

fn parse_ledger_xml(xml: &str) -> Result<Vec<ImageRecord>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut in_image = false;
    let mut field: Option<LedgerField> = None;
    let mut url = String::new();
    let mut description = String::new();

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => match e.name().as_ref() {
                b"Image" => {
                    in_image = true;
                    url.clear();
                    description.clear();
                }
                b"URL" if in_image => field = Some(LedgerField::Url),
                b"Description" if in_image => field = Some(LedgerField::Description),
                _ => field = None,
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                match field {
                    Some(LedgerField::Url) => url.push_str(&text),
                    Some(LedgerField::Description) => description.push_str(&text),
                    None => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"Image" => {
                    in_image = false;
                    records.push(ImageRecord::new(url.clone(), description.clone()));
                }
                b"URL" | b"Description" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}
