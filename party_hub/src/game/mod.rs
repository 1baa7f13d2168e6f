//! Game engine: cards, decks, both game state machines and their
//! per-player projections.
//!
//! Each game is a plain state machine that validates an action before it
//! mutates anything, queues the resulting [`events::Notice`]s, and can
//! project itself for any seated player. [`session::GameSession`] wraps both
//! games behind one [`session::SessionRules`] trait for the room actors.

pub mod awful;
pub mod constants;
pub mod deck;
pub mod errors;
pub mod events;
pub mod player;
pub mod session;
pub mod views;
pub mod wildcard;

pub use errors::{ErrorKind, GameError};
pub use events::{Audience, GameEvent, Notice, SubmissionId};
pub use player::{DisplayName, PlayerId, Roles};
pub use session::{ActionOutcome, GameKind, GameSession, RoomAction, SessionRules};
pub use views::GameView;
