//! Room module providing concurrent rooms with an async actor model.
//!
//! This module implements:
//! - RoomActor: async actor owning a single room's game session
//! - RoomManager: registry of live rooms and of which player sits where
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each room runs in a separate Tokio task with an mpsc message inbox, so
//! exactly one task ever mutates a session. After every accepted message the
//! actor fans events and per-member snapshots out to each member's bounded
//! outbound queue with `try_send`, so nothing awaits between a mutation and
//! its broadcast.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use manager::{Entrant, RoomManager, RoomSettings, normalize_room_code};
pub use messages::{Departure, RoomMessage, RoomSummary};
