use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    auth::Capability,
    game::{
        DisplayName, ErrorKind, GameError, GameEvent, GameKind, GameView, PlayerId, RoomAction,
        SubmissionId, wildcard::Color,
    },
    room::RoomSummary,
};

/// A command from a client, one per WebSocket text frame.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    CreateRoom {
        game: GameKind,
        display_name: DisplayName,
        capacity: Option<usize>,
        secret: Option<String>,
    },
    JoinRoom {
        room_code: String,
        display_name: DisplayName,
        secret: Option<String>,
    },
    StartGame {
        room_code: String,
    },
    PlayCard {
        room_code: String,
        card_index: usize,
        chosen_color: Option<Color>,
    },
    DrawCard {
        room_code: String,
    },
    PassTurn {
        room_code: String,
    },
    CallShortHandWarning {
        room_code: String,
    },
    SubmitAnswer {
        room_code: String,
        card_indexes: Vec<usize>,
    },
    /// The judge picks one of the anonymous submissions they were shown.
    SelectWinner {
        room_code: String,
        #[serde(alias = "winnerId")]
        submission_id: SubmissionId,
    },
    NextRound {
        room_code: String,
    },
    LeaveRoom {
        room_code: String,
    },
    ListRooms,
    Login {
        username: String,
        password: String,
    },
    GuestLogin {
        username: Option<String>,
    },
    Register {
        username: String,
        password: String,
    },
    KickPlayer {
        room_code: String,
        target: PlayerId,
    },
    ForceStart {
        room_code: String,
    },
    EndGame {
        room_code: String,
    },
    ResetGame {
        room_code: String,
    },
    ChangeTopColor {
        room_code: String,
        color: Color,
    },
    ForceDraw {
        room_code: String,
        target: PlayerId,
        count: usize,
    },
    SkipTurn {
        room_code: String,
    },
}

impl ClientCommand {
    /// The room this command addresses, if any.
    pub fn room_code(&self) -> Option<&str> {
        match self {
            Self::CreateRoom { .. }
            | Self::ListRooms
            | Self::Login { .. }
            | Self::GuestLogin { .. }
            | Self::Register { .. } => None,
            Self::JoinRoom { room_code, .. }
            | Self::StartGame { room_code }
            | Self::PlayCard { room_code, .. }
            | Self::DrawCard { room_code }
            | Self::PassTurn { room_code }
            | Self::CallShortHandWarning { room_code }
            | Self::SubmitAnswer { room_code, .. }
            | Self::SelectWinner { room_code, .. }
            | Self::NextRound { room_code }
            | Self::LeaveRoom { room_code }
            | Self::KickPlayer { room_code, .. }
            | Self::ForceStart { room_code }
            | Self::EndGame { room_code }
            | Self::ResetGame { room_code }
            | Self::ChangeTopColor { room_code, .. }
            | Self::ForceDraw { room_code, .. }
            | Self::SkipTurn { room_code } => Some(room_code),
        }
    }

    /// Split an in-room command into its room code and session action.
    /// Membership, lobby and login commands return `None`.
    pub fn into_room_action(self) -> Option<(String, RoomAction)> {
        let pair = match self {
            Self::StartGame { room_code } => (room_code, RoomAction::Start),
            Self::ForceStart { room_code } => (room_code, RoomAction::ForceStart),
            Self::PlayCard {
                room_code,
                card_index,
                chosen_color,
            } => (
                room_code,
                RoomAction::Play {
                    card_index,
                    color: chosen_color,
                },
            ),
            Self::DrawCard { room_code } => (room_code, RoomAction::Draw),
            Self::PassTurn { room_code } => (room_code, RoomAction::Pass),
            Self::CallShortHandWarning { room_code } => (room_code, RoomAction::CallWarning),
            Self::SubmitAnswer {
                room_code,
                card_indexes,
            } => (room_code, RoomAction::Submit { card_indexes }),
            Self::SelectWinner {
                room_code,
                submission_id,
            } => (
                room_code,
                RoomAction::SelectWinner {
                    submission: submission_id,
                },
            ),
            Self::NextRound { room_code } => (room_code, RoomAction::NextRound),
            Self::EndGame { room_code } => (room_code, RoomAction::EndGame),
            Self::ResetGame { room_code } => (room_code, RoomAction::Reset),
            Self::ChangeTopColor { room_code, color } => {
                (room_code, RoomAction::ChangeTopColor { color })
            }
            Self::ForceDraw {
                room_code,
                target,
                count,
            } => (room_code, RoomAction::ForceDraw { target, count }),
            Self::SkipTurn { room_code } => (room_code, RoomAction::SkipTurn),
            Self::CreateRoom { .. }
            | Self::JoinRoom { .. }
            | Self::LeaveRoom { .. }
            | Self::ListRooms
            | Self::Login { .. }
            | Self::GuestLogin { .. }
            | Self::Register { .. }
            | Self::KickPlayer { .. } => return None,
        };
        Some(pair)
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::CreateRoom { game, .. } => format!("create {game} room"),
            Self::JoinRoom { room_code, .. } => format!("join {room_code}"),
            Self::StartGame { .. } => "start game".to_string(),
            Self::PlayCard { card_index, .. } => format!("play card {card_index}"),
            Self::DrawCard { .. } => "draw".to_string(),
            Self::PassTurn { .. } => "pass".to_string(),
            Self::CallShortHandWarning { .. } => "call last card".to_string(),
            Self::SubmitAnswer { card_indexes, .. } => format!("submit {card_indexes:?}"),
            Self::SelectWinner { submission_id, .. } => format!("pick {submission_id}"),
            Self::NextRound { .. } => "next round".to_string(),
            Self::LeaveRoom { room_code } => format!("leave {room_code}"),
            Self::ListRooms => "list rooms".to_string(),
            Self::Login { username, .. } => format!("login as {username}"),
            Self::GuestLogin { .. } => "guest login".to_string(),
            Self::Register { username, .. } => format!("register {username}"),
            Self::KickPlayer { target, .. } => format!("kick {target}"),
            Self::ForceStart { .. } => "force start".to_string(),
            Self::EndGame { .. } => "end game".to_string(),
            Self::ResetGame { .. } => "reset game".to_string(),
            Self::ChangeTopColor { color, .. } => format!("change color to {color}"),
            Self::ForceDraw { target, count, .. } => format!("force {target} to draw {count}"),
            Self::SkipTurn { .. } => "skip turn".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// A message from the hub to one client.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Sent once when the connection opens.
    Welcome {
        player_id: PlayerId,
        display_name: DisplayName,
    },
    RoomCreated {
        room_code: String,
        game: GameKind,
    },
    RoomJoined {
        room_code: String,
        game: GameKind,
    },
    RoomLeft {
        room_code: String,
    },
    RoomList(Vec<RoomSummary>),
    LoginResult {
        success: bool,
        display_name: Option<DisplayName>,
        capability: Capability,
        message: Option<String>,
    },
    RegisterResult {
        success: bool,
        message: String,
    },
    StateSnapshot(GameView),
    GameEvent(GameEvent),
    ActionRejected {
        reason: String,
        kind: ErrorKind,
    },
}

impl ServerMessage {
    pub fn rejected(error: &GameError) -> Self {
        Self::ActionRejected {
            reason: error.to_string(),
            kind: error.kind(),
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Welcome { display_name, .. } => format!("welcome {display_name}"),
            Self::RoomCreated { room_code, .. } => format!("created {room_code}"),
            Self::RoomJoined { room_code, .. } => format!("joined {room_code}"),
            Self::RoomLeft { room_code } => format!("left {room_code}"),
            Self::RoomList(rooms) => format!("{} rooms", rooms.len()),
            Self::LoginResult { success, .. } => {
                if *success {
                    "login succeeded".to_string()
                } else {
                    "login failed".to_string()
                }
            }
            Self::RegisterResult { message, .. } => message.clone(),
            Self::StateSnapshot(view) => format!("snapshot of {}", view.room_code()),
            Self::GameEvent(event) => event.to_string(),
            Self::ActionRejected { reason, .. } => reason.clone(),
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === ClientCommand Tests ===

    #[test]
    fn test_parse_play_card() {
        let json = r#"{"type":"playCard","roomCode":"ABCD","cardIndex":2,"chosenColor":"red"}"#;
        let command: ClientCommand = serde_json::from_str(json).unwrap();
        assert_eq!(
            command,
            ClientCommand::PlayCard {
                room_code: "ABCD".to_string(),
                card_index: 2,
                chosen_color: Some(Color::Red),
            }
        );
    }

    #[test]
    fn test_parse_create_room_optional_fields() {
        let json = r#"{"type":"createRoom","game":"awfulAnswers","displayName":"  bob "}"#;
        let command: ClientCommand = serde_json::from_str(json).unwrap();
        let ClientCommand::CreateRoom {
            game,
            display_name,
            capacity,
            secret,
        } = command
        else {
            panic!("expected createRoom");
        };
        assert_eq!(game, GameKind::AwfulAnswers);
        assert_eq!(display_name.as_str(), "bob");
        assert!(capacity.is_none());
        assert!(secret.is_none());
    }

    #[test]
    fn test_parse_unit_command() {
        let command: ClientCommand = serde_json::from_str(r#"{"type":"listRooms"}"#).unwrap();
        assert_eq!(command, ClientCommand::ListRooms);
        assert!(command.room_code().is_none());
    }

    #[test]
    fn test_parse_select_winner() {
        let handle = SubmissionId(uuid::Uuid::from_u128(42));
        let json = format!(
            r#"{{"type":"selectWinner","roomCode":"ABCD","submissionId":"{handle}"}}"#
        );
        let command: ClientCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(
            command.into_room_action(),
            Some((
                "ABCD".to_string(),
                RoomAction::SelectWinner { submission: handle }
            ))
        );

        // Older clients still send the field as `winnerId`.
        let json = format!(r#"{{"type":"selectWinner","roomCode":"ABCD","winnerId":"{handle}"}}"#);
        assert!(serde_json::from_str::<ClientCommand>(&json).is_ok());
    }

    #[test]
    fn test_parse_register() {
        let json = r#"{"type":"register","username":"newbie","password":"letmein"}"#;
        let command: ClientCommand = serde_json::from_str(json).unwrap();
        assert!(command.room_code().is_none());
        assert_eq!(command.to_string(), "register newbie");
        assert!(command.into_room_action().is_none());
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"cheat"}"#).is_err());
    }

    #[test]
    fn test_into_room_action() {
        let command = ClientCommand::SubmitAnswer {
            room_code: "WXYZ".to_string(),
            card_indexes: vec![3, 1],
        };
        assert_eq!(
            command.into_room_action(),
            Some((
                "WXYZ".to_string(),
                RoomAction::Submit {
                    card_indexes: vec![3, 1]
                }
            ))
        );
        let join = ClientCommand::JoinRoom {
            room_code: "WXYZ".to_string(),
            display_name: "amy".into(),
            secret: None,
        };
        assert_eq!(join.room_code(), Some("WXYZ"));
        assert!(join.into_room_action().is_none());
    }

    // === ServerMessage Tests ===

    #[test]
    fn test_rejection_wire_format() {
        let message = ServerMessage::rejected(&GameError::NotYourTurn);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "actionRejected");
        assert_eq!(json["payload"]["reason"], "not your turn");
        assert_eq!(json["payload"]["kind"], "illegalMove");
    }

    #[test]
    fn test_game_event_wire_format() {
        let message = ServerMessage::GameEvent(GameEvent::RoomClosed);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "gameEvent");
        assert_eq!(json["payload"]["type"], "roomClosed");
    }

    #[test]
    fn test_server_message_display() {
        let message = ServerMessage::RoomLeft {
            room_code: "ABCD".to_string(),
        };
        assert_eq!(message.to_string(), "left ABCD");
    }
}
