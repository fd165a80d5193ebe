use super::{PersistenceError, RecordStore, parse_record};
use crate::models::PersistedRecord;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::Write;

/// File name used when the configuration does not name one.
pub const DEFAULT_STATE_FILE: &str = "channels_state.json";

/// Stores the record as a JSON object in a single file.
///
/// Writes go to `<file>.tmp` first and are renamed over the target, so an
/// interrupted save leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Utf8PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn temp_path(&self) -> Utf8PathBuf {
        let mut name = self
            .path
            .file_name()
            .unwrap_or(DEFAULT_STATE_FILE)
            .to_string();
        name.push_str(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Utf8Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> PersistedRecord {
        if !self.path.exists() {
            tracing::info!("No saved channel state at {}, starting empty", self.path);
            return PersistedRecord::empty();
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to read channel state {}: {}, starting empty", self.path, e);
                return PersistedRecord::empty();
            }
        };

        match parse_record(&contents) {
            Ok(record) => {
                tracing::info!("Loaded channel state from {}", self.path);
                record
            }
            Err(reason) => {
                tracing::warn!(
                    "Ignoring corrupt channel state {}: {}, starting empty",
                    self.path,
                    reason
                );
                PersistedRecord::empty()
            }
        }
    }

    fn save(&self, record: &PersistedRecord) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
            }
        }

        let json = serde_json::to_vec(record)?;

        let tmp_path = self.temp_path();
        {
            let mut file = fs::File::create(&tmp_path).map_err(|e| self.io_error(&tmp_path, e))?;
            file.write_all(&json)
                .and_then(|_| file.sync_all())
                .map_err(|e| self.io_error(&tmp_path, e))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(&self.path, e))?;

        tracing::debug!("Saved channel state to {}", self.path);
        Ok(())
    }

    fn location(&self) -> String {
        self.path.to_string()
    }
}
