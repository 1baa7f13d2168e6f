//! Room actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{
    game::{ActionOutcome, DisplayName, GameError, GameKind, GameView, PlayerId, RoomAction, Roles},
    net::messages::ServerMessage,
};

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Seat a player and start forwarding room traffic to `outbound`
    Join {
        player_id: PlayerId,
        name: DisplayName,
        roles: Roles,
        secret: Option<String>,
        outbound: mpsc::Sender<ServerMessage>,
        response: oneshot::Sender<Result<GameKind, GameError>>,
    },

    /// Voluntary leave or disconnect
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<Result<Departure, GameError>>,
    },

    /// Forced removal by a moderator
    Kick {
        target: PlayerId,
        response: oneshot::Sender<Result<Departure, GameError>>,
    },

    /// In-game action
    Action {
        player_id: PlayerId,
        action: RoomAction,
        response: oneshot::Sender<Result<ActionOutcome, GameError>>,
    },

    /// Lobby browser summary
    GetSummary {
        response: oneshot::Sender<RoomSummary>,
    },

    /// Projection for one member
    GetView {
        player_id: PlayerId,
        response: oneshot::Sender<Option<GameView>>,
    },

    /// Close the room, notifying every member
    Close {
        response: oneshot::Sender<Vec<PlayerId>>,
    },
}

/// Result of a player leaving a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// Players still seated afterwards. Zero means the room shut down.
    pub remaining: usize,
}

/// Public description of a live room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: String,
    pub game: GameKind,
    pub host_name: Option<DisplayName>,
    pub occupancy: usize,
    pub capacity: usize,
    pub started: bool,
    pub has_secret: bool,
}

impl RoomSummary {
    pub fn is_full(&self) -> bool {
        self.occupancy >= self.capacity
    }
}
