//! Room configuration models.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use crate::game::{
    GameError, GameKind,
    constants::{DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY},
};

/// Room configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Game hosted by the room
    pub game: GameKind,

    /// Maximum number of players (2-10)
    pub capacity: usize,

    /// Argon2id hash of the room password, if the room has one
    pub secret_hash: Option<String>,
}

impl RoomConfig {
    pub fn new(game: GameKind) -> Self {
        Self {
            game,
            capacity: DEFAULT_CAPACITY,
            secret_hash: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Protect the room with a password. Empty passwords leave the room open.
    pub fn with_secret(mut self, secret: &str) -> Result<Self, GameError> {
        if secret.is_empty() {
            self.secret_hash = None;
            return Ok(self);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| {
                log::error!("Failed to hash room password: {e}");
                GameError::BadSecret
            })?
            .to_string();
        self.secret_hash = Some(hash);
        Ok(self)
    }

    pub fn has_secret(&self) -> bool {
        self.secret_hash.is_some()
    }

    /// Check a join attempt's password against the room's.
    pub fn verify_secret(&self, candidate: Option<&str>) -> Result<(), GameError> {
        let Some(required_hash) = &self.secret_hash else {
            return Ok(());
        };
        let candidate = candidate.ok_or(GameError::BadSecret)?;
        let parsed_hash = PasswordHash::new(required_hash).map_err(|_| {
            log::error!("Invalid room password hash format");
            GameError::BadSecret
        })?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .map_err(|_| GameError::BadSecret)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&self.capacity) {
            return Err(GameError::InvalidCapacity {
                min: MIN_CAPACITY,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }
}
