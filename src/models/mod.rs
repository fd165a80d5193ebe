//! Data models for the PDA counter.
//!
//! - [`ChannelState`]: the persisted fields of one channel (count, stack, state, last input)
//! - [`PersistedRecord`]: all three channels as written to disk, keyed by [`ChannelName`]
//! - [`PdaState`] / [`InputSymbol`]: the fixed state set {q0, q1, qf} and alphabet {"-", "1", "R"}
//! - [`UserConfig`]: settings loaded from `PDA Counter Config.yaml`
//!
//! All of these derive `Serialize`/`Deserialize`; the record goes to JSON, the
//! configuration to YAML.

pub mod channel;
pub mod config;

pub use channel::{
    ChannelName, ChannelState, DEFAULT_TARGET, InputSymbol, PdaState, PersistedRecord,
    RecordError, STACK_SYMBOL,
};
pub use config::{CounterSettings, SaveFailurePolicy, UserConfig};
