//! # Party Hub
//!
//! A room-based multiplayer card-game hub running two party games side by side:
//!
//! - **WildCard**: a shedding game with colored number and action cards, wild
//!   cards, stacked draw penalties and the short-hand warning
//! - **Awful Answers**: a prompt-and-answer game where a rotating judge picks
//!   the funniest submission each round
//!
//! ## Architecture
//!
//! Each room runs as an actor on its own Tokio task and owns one
//! [`GameSession`], an `enum_dispatch` over the two game state machines.
//! Every accepted command mutates the session, then the room fans out events
//! and a per-recipient [`GameView`] to each member. Views never include
//! another player's hand.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, decks, both state machines, events and projections
//! - [`room`]: Room actors and the registry that spawns and tracks them
//! - [`hub`]: Per-connection command dispatch and the capability check
//! - [`auth`]: Login, capability policy, leaderboard and name screening
//! - [`net`]: Client commands and server messages
//!
//! ## Example
//!
//! ```
//! use party_hub::game::{PlayerId, wildcard::WildCardGame};
//!
//! let mut game = WildCardGame::new("ABCD", 4);
//! game.add_player(PlayerId::new(), "alice".into(), Default::default()).unwrap();
//! assert_eq!(game.player_count(), 1);
//! ```

/// Authentication, capability policy and the other hub collaborators.
pub mod auth;

/// Core game logic, cards and state machines.
pub mod game;
pub use game::{
    ActionOutcome, ErrorKind, GameError, GameEvent, GameKind, GameSession, GameView, PlayerId,
    RoomAction, SessionRules, SubmissionId,
};

/// Command dispatch for connected clients.
pub mod hub;
pub use hub::{ConnectionContext, GameHub, HubSettings};

/// Wire protocol.
pub mod net;
pub use net::messages::{ClientCommand, ServerMessage};

/// Room actors and the room registry.
pub mod room;
pub use room::{RoomManager, RoomSettings, RoomSummary};
