//! Game events and who gets to see them.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{
    awful::{AnswerCard, PromptCard},
    player::{DisplayName, PlayerId},
    wildcard::{Card, Color},
};

/// Why a player was made to draw.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PenaltyReason {
    /// Accumulated Draw Two / Wild Draw Four cards.
    Stacked,
    /// Got down to one card without calling the short-hand warning.
    ShortHand,
    /// A privileged user forced the draw.
    Forced,
}

/// Opaque handle for one revealed submission. A fresh one is minted for
/// every answer each round and only the session knows whose it is.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubmissionId(pub Uuid);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One submission as the judge sees it: anonymous and in shuffled order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedAnswer {
    pub submission_id: SubmissionId,
    pub cards: Vec<AnswerCard>,
}

/// Events that occur during a room's lifetime.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    PlayerJoined {
        player_id: PlayerId,
        name: DisplayName,
    },
    PlayerLeft {
        player_id: PlayerId,
        name: DisplayName,
    },
    Kicked {
        player_id: PlayerId,
        name: DisplayName,
    },
    HostChanged {
        player_id: PlayerId,
    },
    GameStarted {
        first_player: PlayerId,
    },
    /// The game dropped back to the lobby because too few players remain.
    ReturnedToLobby,
    NeedColorChoice {
        card_index: usize,
    },
    CardPlayed {
        player_id: PlayerId,
        card: Card,
    },
    CardDrawn {
        player_id: PlayerId,
        count: usize,
    },
    TurnPassed {
        player_id: PlayerId,
    },
    TopColorChanged {
        color: Color,
    },
    ShortHandWarningCalled {
        player_id: PlayerId,
    },
    PenaltyApplied {
        player_id: PlayerId,
        count: usize,
        reason: PenaltyReason,
    },
    AnswerSubmitted {
        player_id: PlayerId,
    },
    AnswersRevealed {
        answers: Vec<RevealedAnswer>,
    },
    RoundWinner {
        player_id: PlayerId,
        name: DisplayName,
        prompt: PromptCard,
        cards: Vec<AnswerCard>,
    },
    RoundStarted {
        judge: PlayerId,
        prompt: PromptCard,
    },
    GameOver {
        winner: PlayerId,
        name: DisplayName,
    },
    RoomClosed,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerJoined { name, .. } => format!("{name} joined the room"),
            Self::PlayerLeft { name, .. } => format!("{name} left the room"),
            Self::Kicked { name, .. } => format!("{name} was kicked"),
            Self::HostChanged { player_id } => format!("{player_id} is now the host"),
            Self::GameStarted { .. } => "game started".to_string(),
            Self::ReturnedToLobby => "not enough players, back to the lobby".to_string(),
            Self::NeedColorChoice { .. } => "choose a color".to_string(),
            Self::CardPlayed { player_id, card } => format!("{player_id} played {card}"),
            Self::CardDrawn { player_id, count } => format!("{player_id} drew {count}"),
            Self::TurnPassed { player_id } => format!("{player_id} passed"),
            Self::TopColorChanged { color } => format!("color changed to {color}"),
            Self::ShortHandWarningCalled { player_id } => {
                format!("{player_id} is down to their last card")
            }
            Self::PenaltyApplied {
                player_id, count, ..
            } => format!("{player_id} drew {count} as a penalty"),
            Self::AnswerSubmitted { player_id } => format!("{player_id} submitted"),
            Self::AnswersRevealed { answers } => format!("{} answers revealed", answers.len()),
            Self::RoundWinner { name, .. } => format!("{name} won the round"),
            Self::RoundStarted { prompt, .. } => format!("new round: {prompt}"),
            Self::GameOver { name, .. } => format!("{name} won the game"),
            Self::RoomClosed => "room closed".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// Recipients of a notice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Audience {
    Everyone,
    Only(PlayerId),
    AllExcept(PlayerId),
}

impl Audience {
    pub fn includes(&self, id: &PlayerId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Only(target) => target == id,
            Self::AllExcept(excluded) => excluded != id,
        }
    }
}

/// An event addressed to an audience.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub audience: Audience,
    pub event: GameEvent,
}

impl Notice {
    pub fn everyone(event: GameEvent) -> Self {
        Self {
            audience: Audience::Everyone,
            event,
        }
    }

    pub fn only(id: PlayerId, event: GameEvent) -> Self {
        Self {
            audience: Audience::Only(id),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_includes() {
        let a = PlayerId::new();
        let b = PlayerId::new();
        assert!(Audience::Everyone.includes(&a));
        assert!(Audience::Only(a).includes(&a));
        assert!(!Audience::Only(a).includes(&b));
        assert!(!Audience::AllExcept(a).includes(&a));
        assert!(Audience::AllExcept(a).includes(&b));
    }

    #[test]
    fn test_event_wire_format() {
        let id = PlayerId::new();
        let event = GameEvent::CardDrawn {
            player_id: id,
            count: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "cardDrawn");
        assert_eq!(json["playerId"], id.to_string());
        assert_eq!(json["count"], 2);
    }

    #[test]
    fn test_revealed_answer_carries_no_player() {
        let answer = RevealedAnswer {
            submission_id: SubmissionId(Uuid::from_u128(7)),
            cards: vec![AnswerCard("A bold choice".into())],
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert!(json.get("playerId").is_none());
        assert_eq!(json["submissionId"], Uuid::from_u128(7).to_string());
    }

    #[test]
    fn test_event_display() {
        let event = GameEvent::GameOver {
            winner: PlayerId::new(),
            name: DisplayName::new("alice"),
        };
        assert_eq!(event.to_string(), "alice won the game");
    }
}
