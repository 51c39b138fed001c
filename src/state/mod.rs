//! Persisted run state: progress cursor, failure ledger, and status logs.

mod error;
mod ledger;
mod progress;
mod status_log;
mod xml;

pub use error::StateError;
pub use ledger::{LedgerStore, XmlLedgerFile};
pub use progress::{DATE_FORMAT, ProgressStore, XmlProgressFile};
pub use status_log::{StatusLog, format_status_entry};
