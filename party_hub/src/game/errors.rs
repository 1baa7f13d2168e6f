//! Errors produced by room and game transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a rejected action, sent alongside the reason so
/// clients can react without parsing messages.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    IllegalMove,
    NotFound,
    CapacityExceeded,
    Unauthorized,
    ResourceExhausted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Validation => "validation",
            Self::IllegalMove => "illegal move",
            Self::NotFound => "not found",
            Self::CapacityExceeded => "capacity exceeded",
            Self::Unauthorized => "unauthorized",
            Self::ResourceExhausted => "resource exhausted",
        };
        write!(f, "{repr}")
    }
}

/// Errors that can occur while acting on a room or game.
///
/// Every transition validates before it mutates, so returning one of these
/// guarantees the session was left untouched.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("room does not exist")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("already in this room")]
    AlreadyJoined,
    #[error("already in another room")]
    AlreadyInRoom,
    #[error("not in this room")]
    NotInRoom,
    #[error("wrong room password")]
    BadSecret,
    #[error("game already in progress")]
    AlreadyStarted,
    #[error("game has not started")]
    NotStarted,
    #[error("need {needed}+ players, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },
    #[error("not your turn")]
    NotYourTurn,
    #[error("no card at index {0}")]
    InvalidCardIndex(usize),
    #[error("card can't be played on the top card")]
    IllegalMove,
    #[error("already drew a card this turn")]
    AlreadyDrawnThisTurn,
    #[error("draw a card before passing")]
    MustDrawFirst,
    #[error("choose a color for the pending wild card first")]
    ColorChoicePending,
    #[error("a draw penalty is pending")]
    PenaltyPending,
    #[error("can only call with exactly two cards in hand")]
    WarningNotAllowed,
    #[error("no cards left to draw")]
    NoCardsAvailable,
    #[error("deck is empty")]
    EmptyDeck,
    #[error("the judge doesn't submit answers")]
    JudgeCannotSubmit,
    #[error("already submitted this round")]
    AlreadySubmitted,
    #[error("must pick exactly {expected} distinct cards")]
    InvalidSelection { expected: usize },
    #[error("not accepting answers right now")]
    NotAcceptingAnswers,
    #[error("only the judge can pick a winner")]
    NotJudge,
    #[error("that player didn't submit this round")]
    InvalidWinner,
    #[error("answers aren't ready for judging")]
    NotJudging,
    #[error("round isn't over yet")]
    RoundInProgress,
    #[error("only the host can do that")]
    NotHost,
    #[error("insufficient privileges")]
    MissingCapability,
    #[error("invalid color")]
    InvalidColor,
    #[error("invalid room code")]
    InvalidRoomCode,
    #[error("display name not allowed")]
    DisallowedName,
    #[error("capacity must be between {min} and {max}")]
    InvalidCapacity { min: usize, max: usize },
    #[error("invalid card count")]
    InvalidCount,
    #[error("action not supported by this game")]
    UnsupportedAction,
    #[error("player does not exist")]
    PlayerNotFound,
    #[error("too many rooms open")]
    TooManyRooms,
    #[error("login failed")]
    AuthenticationFailed,
    #[error("registration failed: {0}")]
    RegistrationFailed(String),
    #[error("room is closed")]
    RoomClosed,
}

impl GameError {
    /// Classify this error for the wire.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound | Self::PlayerNotFound | Self::NotInRoom => ErrorKind::NotFound,
            Self::RoomFull | Self::InvalidCapacity { .. } => ErrorKind::CapacityExceeded,
            Self::BadSecret
            | Self::NotHost
            | Self::NotJudge
            | Self::MissingCapability
            | Self::AuthenticationFailed => ErrorKind::Unauthorized,
            Self::NoCardsAvailable | Self::EmptyDeck | Self::TooManyRooms | Self::RoomClosed => {
                ErrorKind::ResourceExhausted
            }
            Self::NotYourTurn
            | Self::IllegalMove
            | Self::AlreadyDrawnThisTurn
            | Self::MustDrawFirst
            | Self::ColorChoicePending
            | Self::PenaltyPending
            | Self::WarningNotAllowed
            | Self::JudgeCannotSubmit
            | Self::AlreadySubmitted
            | Self::NotAcceptingAnswers
            | Self::InvalidWinner
            | Self::NotJudging
            | Self::RoundInProgress => ErrorKind::IllegalMove,
            Self::AlreadyJoined
            | Self::AlreadyInRoom
            | Self::AlreadyStarted
            | Self::NotStarted
            | Self::NotEnoughPlayers { .. }
            | Self::InvalidCardIndex(_)
            | Self::InvalidSelection { .. }
            | Self::InvalidColor
            | Self::InvalidCount
            | Self::InvalidRoomCode
            | Self::DisallowedName
            | Self::RegistrationFailed(_)
            | Self::UnsupportedAction => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(GameError::NotYourTurn.to_string(), "not your turn");
        assert_eq!(
            GameError::NotEnoughPlayers { needed: 4, have: 2 }.to_string(),
            "need 4+ players, have 2"
        );
        assert_eq!(GameError::InvalidCardIndex(9).to_string(), "no card at index 9");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(GameError::RoomNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(GameError::RoomFull.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(GameError::BadSecret.kind(), ErrorKind::Unauthorized);
        assert_eq!(GameError::IllegalMove.kind(), ErrorKind::IllegalMove);
        assert_eq!(GameError::NoCardsAvailable.kind(), ErrorKind::ResourceExhausted);
        assert_eq!(GameError::AlreadyStarted.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_kind_serializes_camel_case() {
        let json = serde_json::to_string(&ErrorKind::ResourceExhausted).unwrap();
        assert_eq!(json, "\"resourceExhausted\"");
    }
}
