use super::{PersistenceError, RecordStore};
use crate::models::PersistedRecord;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory record store.
///
/// Clones share the same storage, so a test can keep one handle while the
/// session owns another. Writes can be made to fail with [`MemoryStore::fail_writes`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<Option<PersistedRecord>>>,
    fail_writes: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a record.
    pub fn with_record(record: PersistedRecord) -> Self {
        let store = Self::new();
        *store.lock() = Some(record);
        store
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// The last successfully saved record, if any.
    pub fn stored(&self) -> Option<PersistedRecord> {
        self.lock().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PersistedRecord>> {
        // A poisoned lock still holds a complete record
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> PersistedRecord {
        match self.lock().as_ref() {
            Some(record) if record.validate().is_ok() => record.clone(),
            Some(_) => {
                tracing::warn!("Ignoring malformed in-memory record, starting empty");
                PersistedRecord::empty()
            }
            None => PersistedRecord::empty(),
        }
    }

    fn save(&self, record: &PersistedRecord) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(PersistenceError::Rejected(self.location()));
        }
        *self.lock() = Some(record.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelName, ChannelState};

    #[test]
    fn test_empty_store_loads_empty_record() {
        let store = MemoryStore::new();
        assert_eq!(store.load(), PersistedRecord::empty());
        assert!(store.stored().is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save(&PersistedRecord::empty()).unwrap();

        assert_eq!(handle.save_count(), 1);
        assert_eq!(handle.stored(), Some(PersistedRecord::empty()));
    }

    #[test]
    fn test_failing_writes() {
        let store = MemoryStore::new();
        store.fail_writes(true);

        let err = store.save(&PersistedRecord::empty()).unwrap_err();
        assert!(matches!(err, PersistenceError::Rejected(_)));
        assert_eq!(store.save_count(), 0);

        store.fail_writes(false);
        assert!(store.save(&PersistedRecord::empty()).is_ok());
    }

    #[test]
    fn test_malformed_record_loads_empty() {
        let mut record = PersistedRecord::empty();
        record.insert(
            ChannelName::A,
            ChannelState {
                count: 2,
                ..ChannelState::default()
            },
        );
        let store = MemoryStore::with_record(record);
        assert_eq!(store.load(), PersistedRecord::empty());
    }
}
