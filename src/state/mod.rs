// Channel registry
//
// Owns the three named channel counters, routes operations by name and emits
// change events so a front end can refresh or notify without the core knowing
// about it.

use crate::channel::ChannelCounter;
use crate::models::{ChannelName, DEFAULT_TARGET, PdaState, PersistedRecord};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors raised when addressing channels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid channel {0:?}, expected one of A, B, C")]
    InvalidChannel(String),
}

/// Change events emitted after a channel is mutated
///
/// `TargetReached` is sent at most once per crossing, right after the
/// `Incremented` event of the same call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A channel consumed "1"
    Incremented {
        channel: ChannelName,
        count: u64,
        state: PdaState,
    },

    /// A channel just moved into qf
    TargetReached {
        channel: ChannelName,
        count: u64,
    },

    /// A channel consumed "R"
    Reset {
        channel: ChannelName,
    },
}

/// The three channel counters of a session.
///
/// Constructed explicitly and handed to whichever component needs it; there is
/// no process-wide instance.
pub struct ChannelRegistry {
    channels: [ChannelCounter; 3],

    /// Broadcast channel for change events
    /// Multiple subscribers can listen; sending with none is fine
    event_tx: broadcast::Sender<ChannelEvent>,
}

impl ChannelRegistry {
    /// Create a registry with three fresh channels sharing one target.
    pub fn new(target: u64) -> Self {
        Self::with_channels(ChannelName::ALL.map(|name| ChannelCounter::new(name, target)))
    }

    /// Rebuild a registry from a persisted record.
    ///
    /// Channels absent from the record start fresh.
    pub fn from_record(record: &PersistedRecord, target: u64) -> Self {
        Self::with_channels(ChannelName::ALL.map(|name| match record.get(name) {
            Some(state) => ChannelCounter::from_state(name, state.clone(), target),
            None => {
                tracing::warn!("Channel {} missing from record, starting fresh", name);
                ChannelCounter::new(name, target)
            }
        }))
    }

    fn with_channels(channels: [ChannelCounter; 3]) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self { channels, event_tx }
    }

    /// Look up a channel by its name.
    pub fn get_channel(&self, name: &str) -> Result<&ChannelCounter, RegistryError> {
        let name: ChannelName = name.parse()?;
        Ok(self.channel(name))
    }

    /// Typed lookup; cannot fail.
    pub fn channel(&self, name: ChannelName) -> &ChannelCounter {
        &self.channels[name.index()]
    }

    fn channel_mut(&mut self, name: &str) -> Result<&mut ChannelCounter, RegistryError> {
        let name: ChannelName = name.parse()?;
        Ok(&mut self.channels[name.index()])
    }

    /// Increment the named channel.
    ///
    /// # Returns
    /// `true` if this call moved the channel into qf
    ///
    /// # Errors
    /// [`RegistryError::InvalidChannel`] for names outside A, B, C; no channel is touched
    pub fn increment_channel(&mut self, name: &str) -> Result<bool, RegistryError> {
        let channel = self.channel_mut(name)?;
        let reached = channel.increment();

        let event = ChannelEvent::Incremented {
            channel: channel.name(),
            count: channel.count(),
            state: channel.state(),
        };
        let reached_event = reached.then(|| ChannelEvent::TargetReached {
            channel: channel.name(),
            count: channel.count(),
        });

        self.emit(event);
        if let Some(event) = reached_event {
            self.emit(event);
        }

        Ok(reached)
    }

    /// Reset the named channel back to q0.
    ///
    /// # Errors
    /// [`RegistryError::InvalidChannel`] for names outside A, B, C
    pub fn reset_channel(&mut self, name: &str) -> Result<(), RegistryError> {
        let channel = self.channel_mut(name)?;
        channel.reset();
        let event = ChannelEvent::Reset {
            channel: channel.name(),
        };
        self.emit(event);
        Ok(())
    }

    /// Current state of all three channels, ready to be saved or displayed.
    pub fn snapshot(&self) -> PersistedRecord {
        self.channels
            .iter()
            .map(|channel| (channel.name(), channel.state_snapshot()))
            .collect()
    }

    /// Iterate channels in A, B, C order.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelCounter> {
        self.channels.iter()
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: ChannelEvent) {
        // Ignore send errors - it's OK if no one is listening
        let _ = self.event_tx.send(event);
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelState, InputSymbol};

    #[test]
    fn test_new_registry() {
        let registry = ChannelRegistry::new(10);
        let names: Vec<_> = registry.channels().map(|c| c.name()).collect();
        assert_eq!(names, vec![ChannelName::A, ChannelName::B, ChannelName::C]);
        assert_eq!(registry.snapshot(), PersistedRecord::empty());
    }

    #[test]
    fn test_default_target() {
        let registry = ChannelRegistry::default();
        assert!(registry.channels().all(|c| c.target() == DEFAULT_TARGET));
    }

    #[test]
    fn test_get_channel_invalid() {
        let registry = ChannelRegistry::new(10);
        let err = registry.get_channel("D").unwrap_err();
        assert_eq!(err, RegistryError::InvalidChannel("D".to_string()));
    }

    #[test]
    fn test_increment_routes_by_name() {
        let mut registry = ChannelRegistry::new(10);
        registry.increment_channel("B").unwrap();
        registry.increment_channel("B").unwrap();

        assert_eq!(registry.get_channel("A").unwrap().count(), 0);
        assert_eq!(registry.get_channel("B").unwrap().count(), 2);
        assert_eq!(registry.get_channel("C").unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_increment_mutates_nothing() {
        let mut registry = ChannelRegistry::new(10);
        let before = registry.snapshot();

        assert!(registry.increment_channel("D").is_err());
        assert!(registry.reset_channel("").is_err());

        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn test_reset_channel() {
        let mut registry = ChannelRegistry::new(10);
        for _ in 0..5 {
            registry.increment_channel("B").unwrap();
        }

        registry.reset_channel("B").unwrap();

        let b = registry.channel(ChannelName::B);
        assert_eq!(b.count(), 0);
        assert!(b.stack().is_empty());
        assert_eq!(b.state(), PdaState::Q0);
        assert_eq!(b.last_input(), InputSymbol::Reset);
    }

    #[test]
    fn test_from_record() {
        let mut record = PersistedRecord::empty();
        record.insert(
            ChannelName::C,
            ChannelState {
                count: 2,
                stack: vec![1, 1],
                state: PdaState::Q1,
                last_input: InputSymbol::One,
            },
        );

        let registry = ChannelRegistry::from_record(&record, 10);
        assert_eq!(registry.snapshot(), record);
    }

    #[test]
    fn test_from_record_inconsistent_channel_starts_fresh() {
        let mut record = PersistedRecord::empty();
        record.insert(
            ChannelName::A,
            ChannelState {
                count: 1,
                stack: vec![1],
                state: PdaState::Q1,
                last_input: InputSymbol::One,
            },
        );
        record.insert(
            ChannelName::B,
            ChannelState {
                count: u64::MAX / 2,
                stack: Vec::new(),
                state: PdaState::Qf,
                last_input: InputSymbol::One,
            },
        );

        let registry = ChannelRegistry::from_record(&record, 10);

        assert_eq!(registry.channel(ChannelName::A).count(), 1);
        assert_eq!(
            registry.snapshot().get(ChannelName::B),
            Some(&ChannelState::default())
        );
    }

    #[test]
    fn test_events_on_target() {
        let mut registry = ChannelRegistry::new(2);
        let mut rx = registry.subscribe();

        registry.increment_channel("A").unwrap();
        assert!(registry.increment_channel("A").unwrap());

        assert!(matches!(
            rx.try_recv().unwrap(),
            ChannelEvent::Incremented { count: 1, state: PdaState::Q1, .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ChannelEvent::Incremented { count: 2, state: PdaState::Qf, .. }
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            ChannelEvent::TargetReached { channel: ChannelName::A, count: 2 }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reset_event() {
        let mut registry = ChannelRegistry::new(2);
        let mut rx = registry.subscribe();

        registry.reset_channel("C").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            ChannelEvent::Reset { channel: ChannelName::C }
        );
    }
}
