//! Durable storage for the channel record.
//!
//! The whole [`PersistedRecord`] is written after every mutation and read back
//! once at startup. Two backends are provided:
//!
//! - [`JsonFileStore`]: the record as a JSON object on disk
//! - [`MemoryStore`]: an in-process store for tests and embedding
//!
//! Loading is total. A missing, unreadable or corrupt resource yields
//! [`PersistedRecord::empty`] instead of an error, so only saving can fail.

pub mod file;
pub mod memory;

pub use file::{DEFAULT_STATE_FILE, JsonFileStore};
pub use memory::MemoryStore;

use crate::models::PersistedRecord;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while writing the record
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to write channel state to {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize channel state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Write rejected by {0}")]
    Rejected(String),
}

/// A place the full channel record can be loaded from and saved to.
///
/// Single-process, single-user access is assumed; concurrent writers would
/// simply overwrite each other.
pub trait RecordStore: Send {
    /// Read the stored record, falling back to the empty record on any failure.
    fn load(&self) -> PersistedRecord;

    /// Overwrite the stored record.
    fn save(&self, record: &PersistedRecord) -> Result<(), PersistenceError>;

    /// Human readable location, used in log messages.
    fn location(&self) -> String;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load(&self) -> PersistedRecord {
        (**self).load()
    }

    fn save(&self, record: &PersistedRecord) -> Result<(), PersistenceError> {
        (**self).save(record)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// Parse a serialized record, rejecting anything that cannot be resumed from.
pub(crate) fn parse_record(contents: &str) -> Result<PersistedRecord, String> {
    let record: PersistedRecord = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    record.validate().map_err(|e| e.to_string())?;
    Ok(record)
}
