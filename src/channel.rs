// Channel counter
//
// One pushdown-automaton styled counter. The alphabet is fixed to {"1", "R"}
// and the topology to q0 -> q1 -> qf, with reset returning to q0 from anywhere.

use crate::models::{ChannelName, ChannelState, InputSymbol, PdaState, STACK_SYMBOL};

/// State machine for a single channel.
///
/// Invariants held after every operation:
/// - `count == stack.len()`
/// - `state == Qf` implies `count >= target`
/// - `state == Q0` iff `count == 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCounter {
    name: ChannelName,
    count: u64,
    stack: Vec<u32>,
    state: PdaState,
    last_input: InputSymbol,
    target: u64,
}

impl ChannelCounter {
    /// Create a fresh channel in q0 with an empty stack.
    ///
    /// A target of 0 is treated as 1; configuration loading rejects 0 before
    /// it gets here.
    pub fn new(name: ChannelName, target: u64) -> Self {
        Self {
            name,
            count: 0,
            stack: Vec::new(),
            state: PdaState::Q0,
            last_input: InputSymbol::None,
            target: target.max(1),
        }
    }

    /// Resume a channel from a persisted state.
    ///
    /// The target is not part of the saved record, so the stored automaton state
    /// is reconciled against the current one. Restoring never counts as reaching
    /// the target. A stack that disagrees with its count is discarded and the
    /// channel starts fresh.
    pub fn from_state(name: ChannelName, state: ChannelState, target: u64) -> Self {
        if !state.is_consistent() {
            tracing::warn!(
                "Channel {}: stack of {} entries does not match count {}, starting fresh",
                name,
                state.stack.len(),
                state.count
            );
            return Self::new(name, target);
        }

        let target = target.max(1);
        let count = state.count;

        let expected = PdaState::for_count(count, target);
        if expected != state.state {
            tracing::warn!(
                "Channel {}: stored state {} does not fit count {} with target {}, using {}",
                name,
                state.state,
                count,
                target,
                expected
            );
        }

        Self {
            name,
            count,
            stack: state.stack,
            state: expected,
            last_input: state.last_input,
            target,
        }
    }

    /// Consume the symbol "1".
    ///
    /// Pushes one entry and counts it. Returns `true` only on the call that
    /// moves the channel into qf; increments past the target keep counting but
    /// never signal again until a reset.
    pub fn increment(&mut self) -> bool {
        self.last_input = InputSymbol::One;
        self.stack.push(STACK_SYMBOL);
        if self.state == PdaState::Q0 {
            self.state = PdaState::Q1;
        }
        self.count += 1;

        if self.count >= self.target && self.state != PdaState::Qf {
            self.state = PdaState::Qf;
            tracing::info!(
                "Channel {} reached target {} (count {})",
                self.name,
                self.target,
                self.count
            );
            return true;
        }

        tracing::trace!("Channel {} incremented to {}", self.name, self.count);
        false
    }

    /// Consume the symbol "R": clear everything and return to q0.
    pub fn reset(&mut self) {
        self.last_input = InputSymbol::Reset;
        self.count = 0;
        self.stack.clear();
        self.state = PdaState::Q0;
        tracing::info!("Channel {} reset", self.name);
    }

    pub fn name(&self) -> ChannelName {
        self.name
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn stack(&self) -> &[u32] {
        &self.stack
    }

    pub fn state(&self) -> PdaState {
        self.state
    }

    pub fn last_input(&self) -> InputSymbol {
        self.last_input
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Whether the channel sits in the terminal state.
    pub fn is_complete(&self) -> bool {
        self.state == PdaState::Qf
    }

    /// Fraction of the target counted so far, capped at 1.0.
    pub fn progress(&self) -> f64 {
        (self.count as f64 / self.target as f64).min(1.0)
    }

    /// Copy of the persisted fields.
    pub fn state_snapshot(&self) -> ChannelState {
        ChannelState {
            count: self.count,
            stack: self.stack.clone(),
            state: self.state,
            last_input: self.last_input,
        }
    }
}
