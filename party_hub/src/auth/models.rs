//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::Roles;

/// What a connection is allowed to do. Ordered, so a higher capability
/// satisfies any lower requirement.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    #[default]
    Player,
    Moderator,
    Admin,
}

impl Capability {
    /// Whether this capability meets `required`.
    pub fn allows(self, required: Capability) -> bool {
        self >= required
    }

    /// Role flags shown to other players in a room.
    pub fn roles(self) -> Roles {
        Roles {
            is_moderator: self >= Capability::Moderator,
            is_privileged: self == Capability::Admin,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Player => "player",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        };
        write!(f, "{repr}")
    }
}

/// Stored account record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_moderator: bool,
    /// Missing in hand-written account files; filled with load time
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn capability(&self) -> Capability {
        if self.is_admin {
            Capability::Admin
        } else if self.is_moderator {
            Capability::Moderator
        } else {
            Capability::Player
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub username: String,
    pub capability: Capability,
}
