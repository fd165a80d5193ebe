use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::state::RegistryError;

/// Default count at which a channel becomes terminal.
pub const DEFAULT_TARGET: u64 = 200_000;

/// Symbol pushed onto a channel stack by every increment.
pub const STACK_SYMBOL: u32 = 1;

/// Name of one of the three tracked channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChannelName {
    A,
    B,
    C,
}

impl ChannelName {
    /// All channels in display and serialization order.
    pub const ALL: [ChannelName; 3] = [ChannelName::A, ChannelName::B, ChannelName::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelName::A => "A",
            ChannelName::B => "B",
            ChannelName::C => "C",
        }
    }

    /// Position of the channel inside [`ChannelName::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ChannelName::A => 0,
            ChannelName::B => 1,
            ChannelName::C => 2,
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelName {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(ChannelName::A),
            "B" | "b" => Ok(ChannelName::B),
            "C" | "c" => Ok(ChannelName::C),
            _ => Err(RegistryError::InvalidChannel(s.to_string())),
        }
    }
}

/// Automaton state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PdaState {
    /// Start state, nothing counted yet
    #[default]
    #[serde(rename = "q0")]
    Q0,
    /// Counting
    #[serde(rename = "q1")]
    Q1,
    /// Target reached
    #[serde(rename = "qf")]
    Qf,
}

impl PdaState {
    /// State a channel with `count` increments must be in for the given target.
    pub fn for_count(count: u64, target: u64) -> Self {
        if count >= target && count > 0 {
            PdaState::Qf
        } else if count == 0 {
            PdaState::Q0
        } else {
            PdaState::Q1
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PdaState::Q0 => "q0",
            PdaState::Q1 => "q1",
            PdaState::Qf => "qf",
        }
    }
}

impl fmt::Display for PdaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last symbol consumed by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputSymbol {
    /// Nothing consumed yet
    #[default]
    #[serde(rename = "-")]
    None,
    /// Increment
    #[serde(rename = "1")]
    One,
    /// Reset
    #[serde(rename = "R")]
    Reset,
}

impl InputSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputSymbol::None => "-",
            InputSymbol::One => "1",
            InputSymbol::Reset => "R",
        }
    }
}

impl fmt::Display for InputSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted state of a single channel.
///
/// The target is not stored here. It comes from the running configuration and
/// is supplied again when a [`ChannelCounter`](crate::channel::ChannelCounter)
/// is restored from this record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelState {
    pub count: u64,
    pub stack: Vec<u32>,
    pub state: PdaState,
    pub last_input: InputSymbol,
}

impl ChannelState {
    /// Check the stack discipline: one `1` on the stack per counted increment.
    pub fn is_consistent(&self) -> bool {
        self.count == self.stack.len() as u64 && self.stack.iter().all(|&s| s == STACK_SYMBOL)
    }
}

/// Reasons a persisted record cannot be resumed from
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("channel {0} is missing")]
    MissingChannel(ChannelName),

    #[error("channel {channel} has an inconsistent stack (count {count}, {entries} entries)")]
    InconsistentStack {
        channel: ChannelName,
        count: u64,
        entries: usize,
    },
}

/// Full application state as written to disk, keyed by channel name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedRecord {
    channels: IndexMap<ChannelName, ChannelState>,
}

impl PersistedRecord {
    /// The canonical record of a brand new session.
    pub fn empty() -> Self {
        Self {
            channels: ChannelName::ALL
                .iter()
                .map(|&name| (name, ChannelState::default()))
                .collect(),
        }
    }

    pub fn get(&self, name: ChannelName) -> Option<&ChannelState> {
        self.channels.get(&name)
    }

    /// Replace the state of one channel.
    pub fn insert(&mut self, name: ChannelName, state: ChannelState) {
        self.channels.insert(name, state);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChannelName, &ChannelState)> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Find the first reason this record cannot be resumed from, if any.
    pub fn validate(&self) -> Result<(), RecordError> {
        for name in ChannelName::ALL {
            match self.channels.get(&name) {
                None => return Err(RecordError::MissingChannel(name)),
                Some(state) if !state.is_consistent() => {
                    return Err(RecordError::InconsistentStack {
                        channel: name,
                        count: state.count,
                        entries: state.stack.len(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Default for PersistedRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<(ChannelName, ChannelState)> for PersistedRecord {
    fn from_iter<I: IntoIterator<Item = (ChannelName, ChannelState)>>(iter: I) -> Self {
        Self {
            channels: iter.into_iter().collect(),
        }
    }
}
