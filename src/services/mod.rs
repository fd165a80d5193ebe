//! Services module - the session that ties channels to durable storage.
//!
//! # Components
//!
//! - [`CounterSession`]: owns the [`ChannelRegistry`](crate::state::ChannelRegistry),
//!   a [`RecordStore`](crate::persistence::RecordStore) and the save failure policy.
//!   Each increment or reset is validated, applied, then followed by a save of the
//!   full record.
//! - [`SessionMode`]: start fresh or resume from the store.
//! - [`SessionError`]: invalid channel names and failed writes.
//!
//! # Usage Example
//!
//! ```ignore
//! use pda_counter::persistence::JsonFileStore;
//! use pda_counter::services::{CounterSession, SessionMode};
//!
//! let store = JsonFileStore::new("channels_state.json");
//! let mut session = CounterSession::start(store, 200_000, SessionMode::Resume);
//!
//! if session.increment("A")? {
//!     println!("Channel A reached target!");
//! }
//! ```

pub mod session;

pub use session::{CounterSession, SessionError, SessionMode};
