use crate::metrics::Metrics;
use crate::models::{ChannelName, PersistedRecord, SaveFailurePolicy};
use crate::persistence::{PersistenceError, RecordStore};
use crate::state::{ChannelRegistry, RegistryError};
use thiserror::Error;

/// How a session obtains its initial channel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Start from the empty record; nothing is written until the first change
    New,
    /// Start from whatever the store holds
    Resume,
}

/// Errors surfaced by session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A running counter session.
///
/// Every successful increment or reset is followed by a save of the full
/// record. Invalid channel names are rejected before anything is mutated or
/// written.
pub struct CounterSession {
    registry: ChannelRegistry,
    store: Box<dyn RecordStore>,
    policy: SaveFailurePolicy,
    metrics: Metrics,
}

impl CounterSession {
    /// Start a session backed by `store`.
    ///
    /// # Arguments
    /// * `store` - Where the record is loaded from and saved to
    /// * `target` - Count at which a channel becomes terminal
    /// * `mode` - Fresh start or resume from the store
    pub fn start<S: RecordStore + 'static>(store: S, target: u64, mode: SessionMode) -> Self {
        let registry = match mode {
            SessionMode::New => {
                tracing::info!("Starting new session (target {})", target);
                ChannelRegistry::new(target)
            }
            SessionMode::Resume => {
                let record = store.load();
                tracing::info!(
                    "Resuming session from {} (target {})",
                    store.location(),
                    target
                );
                ChannelRegistry::from_record(&record, target)
            }
        };

        Self {
            registry,
            store: Box::new(store),
            policy: SaveFailurePolicy::default(),
            metrics: Metrics::new(),
        }
    }

    /// Choose what happens when a save fails.
    pub fn with_save_failure_policy(mut self, policy: SaveFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Increment a channel and save.
    ///
    /// # Returns
    /// `true` if the channel reached its target on this call
    ///
    /// # Errors
    /// - [`SessionError::Registry`] for an unknown channel; nothing changes or is saved
    /// - [`SessionError::Persistence`] if the save fails under [`SaveFailurePolicy::Propagate`];
    ///   the increment itself is kept in memory
    pub fn increment(&mut self, name: &str) -> Result<bool, SessionError> {
        let reached = self
            .registry
            .increment_channel(name)
            .inspect_err(|_| self.metrics.record_invalid_channel())?;
        self.metrics.record_increment(reached);
        self.persist()?;
        Ok(reached)
    }

    /// Reset a channel and save.
    ///
    /// # Errors
    /// Same as [`CounterSession::increment`]
    pub fn reset(&mut self, name: &str) -> Result<(), SessionError> {
        self.registry
            .reset_channel(name)
            .inspect_err(|_| self.metrics.record_invalid_channel())?;
        self.metrics.record_reset();
        self.persist()?;
        Ok(())
    }

    /// Save the current record regardless of the failure policy.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let result = self.store.save(&self.registry.snapshot());
        match &result {
            Ok(()) => self.metrics.record_save(),
            Err(_) => self.metrics.record_save_failure(),
        }
        result
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        match self.save() {
            Ok(()) => Ok(()),
            Err(e) => match self.policy {
                SaveFailurePolicy::Propagate => Err(e),
                SaveFailurePolicy::LogAndContinue => {
                    tracing::error!("Failed to save channel state, continuing: {}", e);
                    Ok(())
                }
            },
        }
    }

    pub fn snapshot(&self) -> PersistedRecord {
        self.registry.snapshot()
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Target shared by all channels of this session.
    pub fn target(&self) -> u64 {
        self.registry.channel(ChannelName::A).target()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn save_failure_policy(&self) -> SaveFailurePolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputSymbol, PdaState};
    use crate::persistence::MemoryStore;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_new_session_ignores_stored_record() {
        let mut stored = PersistedRecord::empty();
        let mut registry = ChannelRegistry::new(5);
        registry.increment_channel("A").unwrap();
        stored.insert(ChannelName::A, registry.channel(ChannelName::A).state_snapshot());

        let store = MemoryStore::with_record(stored);
        let session = CounterSession::start(store.clone(), 5, SessionMode::New);

        assert_eq!(session.snapshot(), PersistedRecord::empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_increment_saves() {
        let store = MemoryStore::new();
        let mut session = CounterSession::start(store.clone(), 3, SessionMode::Resume);

        assert!(!session.increment("A").unwrap());

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.stored().unwrap(), session.snapshot());
    }

    #[test]
    fn test_invalid_channel_saves_nothing() {
        let store = MemoryStore::new();
        let mut session = CounterSession::start(store.clone(), 3, SessionMode::Resume);

        let err = session.increment("D").unwrap_err();

        assert!(matches!(
            err,
            SessionError::Registry(RegistryError::InvalidChannel(_))
        ));
        assert_eq!(store.save_count(), 0);
        assert_eq!(session.snapshot(), PersistedRecord::empty());
        assert_eq!(
            session.metrics().invalid_channel_requests.load(Ordering::Relaxed),
            1
        );
    }

    #[test]
    fn test_save_failure_propagates_by_default() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let mut session = CounterSession::start(store.clone(), 3, SessionMode::New);

        let err = session.increment("B").unwrap_err();

        assert!(matches!(err, SessionError::Persistence(_)));
        // In-memory state moved on even though the write failed
        assert_eq!(session.registry().channel(ChannelName::B).count(), 1);
        assert_eq!(session.metrics().save_failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_save_failure_can_be_logged() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let mut session = CounterSession::start(store, 1, SessionMode::New)
            .with_save_failure_policy(SaveFailurePolicy::LogAndContinue);

        assert!(session.increment("C").unwrap());
        assert_eq!(
            session.registry().channel(ChannelName::C).state(),
            PdaState::Qf
        );
    }

    #[test]
    fn test_reset_saves() {
        let store = MemoryStore::new();
        let mut session = CounterSession::start(store.clone(), 3, SessionMode::New);
        session.increment("A").unwrap();
        session.reset("A").unwrap();

        assert_eq!(store.save_count(), 2);
        let stored = store.stored().unwrap();
        let a = stored.get(ChannelName::A).unwrap();
        assert_eq!(a.count, 0);
        assert!(a.stack.is_empty());
        assert_eq!(a.last_input, InputSymbol::Reset);
    }
}
