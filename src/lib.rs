// PDA Counter - Multi-channel persistent counter
//
// This is the library crate containing the channel state machines, the
// registry, persistence and configuration. The binary crate (main.rs) provides
// a console front end.

pub mod channel;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use channel::ChannelCounter;
pub use config::ConfigManager;
pub use models::{
    ChannelName, ChannelState, InputSymbol, PdaState, PersistedRecord, RecordError, UserConfig,
};
pub use persistence::{JsonFileStore, MemoryStore, PersistenceError, RecordStore};
pub use services::{CounterSession, SessionError, SessionMode};
pub use state::{ChannelEvent, ChannelRegistry, RegistryError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
