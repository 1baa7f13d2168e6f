//! Capability required by each client command.

use super::models::Capability;
use crate::net::messages::ClientCommand;

/// The capability a connection needs before `command` is dispatched.
pub fn required_capability(command: &ClientCommand) -> Capability {
    match command {
        ClientCommand::CreateRoom { .. }
        | ClientCommand::JoinRoom { .. }
        | ClientCommand::StartGame { .. }
        | ClientCommand::PlayCard { .. }
        | ClientCommand::DrawCard { .. }
        | ClientCommand::PassTurn { .. }
        | ClientCommand::CallShortHandWarning { .. }
        | ClientCommand::SubmitAnswer { .. }
        | ClientCommand::SelectWinner { .. }
        | ClientCommand::NextRound { .. }
        | ClientCommand::LeaveRoom { .. }
        | ClientCommand::ListRooms
        | ClientCommand::Login { .. }
        | ClientCommand::GuestLogin { .. }
        | ClientCommand::Register { .. } => Capability::Player,
        ClientCommand::KickPlayer { .. } => Capability::Moderator,
        ClientCommand::ForceStart { .. }
        | ClientCommand::EndGame { .. }
        | ClientCommand::ResetGame { .. }
        | ClientCommand::ChangeTopColor { .. }
        | ClientCommand::ForceDraw { .. }
        | ClientCommand::SkipTurn { .. } => Capability::Admin,
    }
}

/// Whether a connection holding `capability` may send `command`.
pub fn is_permitted(capability: Capability, command: &ClientCommand) -> bool {
    capability.allows(required_capability(command))
}
