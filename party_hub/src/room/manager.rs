//! Room manager for spawning and tracking room actors.

use rand::Rng;
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{RwLock, mpsc, oneshot},
    time::Duration,
};
use uuid::Uuid;

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    messages::{Departure, RoomMessage, RoomSummary},
};
use crate::{
    game::{
        ActionOutcome, DisplayName, GameError, GameKind, GameSession, GameView, PlayerId,
        RoomAction, Roles,
        awful::CardPack,
        constants::{
            AWFUL_WIN_SCORE, MAX_ROOM_CODE_LENGTH, MIN_ROOM_CODE_LENGTH,
            ROOM_CODE_ATTEMPTS_PER_LENGTH, TEARDOWN_DELAY,
        },
    },
    net::messages::ServerMessage,
};

/// Unambiguous characters for room codes (no 0/O or 1/I).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

type RoomMap = Arc<RwLock<HashMap<String, RoomHandle>>>;
type MembershipMap = Arc<RwLock<HashMap<PlayerId, String>>>;

/// Registry-wide limits and the content new rooms are seeded with.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub max_rooms: usize,
    pub teardown_delay: Duration,
    pub awful_win_score: u32,
    pub card_pack: Arc<CardPack>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_rooms: 1000,
            teardown_delay: TEARDOWN_DELAY,
            awful_win_score: AWFUL_WIN_SCORE,
            card_pack: Arc::new(CardPack::builtin()),
        }
    }
}

/// Everything a player brings into a room.
#[derive(Debug, Clone)]
pub struct Entrant {
    pub player_id: PlayerId,
    pub name: DisplayName,
    pub roles: Roles,
    pub outbound: mpsc::Sender<ServerMessage>,
}

/// Room manager for managing every live room
///
/// Each player sits in at most one room at a time; the manager tracks that
/// membership so a dropped connection can be cleaned up by id alone.
#[derive(Clone)]
pub struct RoomManager {
    settings: RoomSettings,

    /// Active room handles by normalized code
    rooms: RoomMap,

    /// Room each player currently sits in
    memberships: MembershipMap,
}

impl RoomManager {
    /// Create a new room manager
    ///
    /// # Arguments
    ///
    /// * `settings` - Room cap, teardown delay and Awful Answers content
    ///
    /// # Returns
    ///
    /// * `RoomManager` - New room manager instance
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            settings,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            memberships: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// Create and spawn a new room with `creator` as its host
    ///
    /// # Arguments
    ///
    /// * `config` - Room configuration
    /// * `creator` - Player creating the room
    ///
    /// # Returns
    ///
    /// * `Result<String, GameError>` - The new room code
    pub async fn create_room(
        &self,
        config: RoomConfig,
        creator: Entrant,
    ) -> Result<String, GameError> {
        config.validate()?;
        if self.room_for(&creator.player_id).await.is_some() {
            return Err(GameError::AlreadyInRoom);
        }

        let mut rooms = self.rooms.write().await;
        if rooms.len() >= self.settings.max_rooms {
            return Err(GameError::TooManyRooms);
        }
        let code = unique_code(&rooms)?;
        let session = GameSession::new(
            config.game,
            &code,
            config.capacity,
            &self.settings.card_pack,
            self.settings.awful_win_score,
        );
        let game = config.game;
        let (actor, handle) =
            RoomActor::new(code.clone(), config, session, self.settings.teardown_delay);
        rooms.insert(code.clone(), handle.clone());
        drop(rooms);

        let rooms = Arc::clone(&self.rooms);
        let memberships = Arc::clone(&self.memberships);
        let instance = handle.instance();
        let room_code = code.clone();
        tokio::spawn(async move {
            let stranded = actor.run().await;
            forget_room(&rooms, &memberships, &room_code, instance, &stranded).await;
        });

        log::info!("Created {} room {}", game, code);

        let player_id = creator.player_id;
        let joined = request(&handle, |response| RoomMessage::Join {
            player_id,
            name: creator.name,
            roles: creator.roles,
            secret: None,
            outbound: creator.outbound,
            response,
        })
        .await
        .and_then(|result| result);
        match joined {
            Ok(_) => {
                self.memberships.write().await.insert(player_id, code.clone());
                Ok(code)
            }
            Err(e) => {
                self.remove_room(&code, instance).await;
                Err(e)
            }
        }
    }

    /// Get a room handle
    ///
    /// # Arguments
    ///
    /// * `code` - Room code, in any case
    ///
    /// # Returns
    ///
    /// * `Option<RoomHandle>` - Room handle if found
    pub async fn get_room(&self, code: &str) -> Option<RoomHandle> {
        let code = normalize_room_code(code).ok()?;
        let rooms = self.rooms.read().await;
        rooms.get(&code).cloned()
    }

    /// The room a player is currently seated in.
    pub async fn room_for(&self, player_id: &PlayerId) -> Option<String> {
        let memberships = self.memberships.read().await;
        memberships.get(player_id).cloned()
    }

    /// Join a room
    ///
    /// # Arguments
    ///
    /// * `code` - Room code, in any case
    /// * `entrant` - Joining player
    /// * `secret` - Password for protected rooms
    ///
    /// # Returns
    ///
    /// * `Result<(String, GameKind), GameError>` - Normalized code and game type
    pub async fn join_room(
        &self,
        code: &str,
        entrant: Entrant,
        secret: Option<String>,
    ) -> Result<(String, GameKind), GameError> {
        let code = normalize_room_code(code)?;
        match self.room_for(&entrant.player_id).await {
            Some(current) if current == code => return Err(GameError::AlreadyJoined),
            Some(_) => return Err(GameError::AlreadyInRoom),
            None => {}
        }
        let handle = self.get_room(&code).await.ok_or(GameError::RoomNotFound)?;

        let player_id = entrant.player_id;
        let game = request(&handle, |response| RoomMessage::Join {
            player_id,
            name: entrant.name,
            roles: entrant.roles,
            secret,
            outbound: entrant.outbound,
            response,
        })
        .await
        .and_then(|result| result)?;

        self.memberships.write().await.insert(player_id, code.clone());
        Ok((code, game))
    }

    /// Leave a room
    ///
    /// # Arguments
    ///
    /// * `code` - Room code, in any case
    /// * `player_id` - Leaving player
    ///
    /// # Returns
    ///
    /// * `Result<(), GameError>` - Success, or `NotInRoom` if the player isn't seated there
    pub async fn leave_room(&self, code: &str, player_id: PlayerId) -> Result<(), GameError> {
        let code = normalize_room_code(code)?;
        if self.room_for(&player_id).await.as_deref() != Some(code.as_str()) {
            return Err(GameError::NotInRoom);
        }
        self.memberships.write().await.remove(&player_id);

        let handle = self.get_room(&code).await.ok_or(GameError::RoomNotFound)?;
        let departure = request(&handle, |response| RoomMessage::Leave {
            player_id,
            response,
        })
        .await
        .and_then(|result| result)?;
        self.after_departure(&handle, departure).await;
        Ok(())
    }

    /// Remove `target` from a room on a moderator's behalf.
    pub async fn kick(&self, code: &str, target: PlayerId) -> Result<(), GameError> {
        let code = normalize_room_code(code)?;
        let handle = self.get_room(&code).await.ok_or(GameError::RoomNotFound)?;
        let departure = request(&handle, |response| RoomMessage::Kick { target, response })
            .await
            .and_then(|result| result)?;

        let mut memberships = self.memberships.write().await;
        if memberships.get(&target) == Some(&code) {
            memberships.remove(&target);
        }
        drop(memberships);

        log::info!("Kicked {} from room {}", target, code);
        self.after_departure(&handle, departure).await;
        Ok(())
    }

    /// Clean up after a dropped connection. Runs the same path as a
    /// voluntary leave.
    ///
    /// # Returns
    ///
    /// * `Option<String>` - The room the player was removed from
    pub async fn handle_disconnect(&self, player_id: PlayerId) -> Option<String> {
        let code = self.room_for(&player_id).await?;
        match self.leave_room(&code, player_id).await {
            Ok(()) => log::debug!("Disconnected player {} left room {}", player_id, code),
            Err(e) => log::debug!("Disconnect cleanup for {} in {}: {}", player_id, code, e),
        }
        Some(code)
    }

    /// Apply an in-game action
    ///
    /// # Arguments
    ///
    /// * `code` - Room code, in any case
    /// * `player_id` - Acting player, who must be seated in the room
    /// * `action` - Action to apply
    ///
    /// # Returns
    ///
    /// * `Result<ActionOutcome, GameError>` - What the action led to
    pub async fn act(
        &self,
        code: &str,
        player_id: PlayerId,
        action: RoomAction,
    ) -> Result<ActionOutcome, GameError> {
        let code = normalize_room_code(code)?;
        if self.room_for(&player_id).await.as_deref() != Some(code.as_str()) {
            return Err(GameError::NotInRoom);
        }
        let handle = self.get_room(&code).await.ok_or(GameError::RoomNotFound)?;
        request(&handle, |response| RoomMessage::Action {
            player_id,
            action,
            response,
        })
        .await
        .and_then(|result| result)
    }

    /// Projection of a room for one of its members.
    pub async fn view(&self, code: &str, player_id: PlayerId) -> Result<Option<GameView>, GameError> {
        let handle = self.get_room(code).await.ok_or(GameError::RoomNotFound)?;
        request(&handle, |response| RoomMessage::GetView {
            player_id,
            response,
        })
        .await
    }

    /// List every live room
    ///
    /// # Returns
    ///
    /// * `Vec<RoomSummary>` - Summaries sorted by room code
    pub async fn list_public_rooms(&self) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = {
            let rooms = self.rooms.read().await;
            rooms.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            match request(&handle, |response| RoomMessage::GetSummary { response }).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => log::debug!("Skipping room {} in listing: {}", handle.code(), e),
            }
        }
        summaries.sort_by(|a, b| a.code.cmp(&b.code));
        summaries
    }

    /// Close a room, notifying and unseating everyone in it
    pub async fn close_room(&self, code: &str) -> Result<(), GameError> {
        let handle = self.get_room(code).await.ok_or(GameError::RoomNotFound)?;
        let members = request(&handle, |response| RoomMessage::Close { response }).await?;
        forget_room(
            &self.rooms,
            &self.memberships,
            handle.code(),
            handle.instance(),
            &members,
        )
        .await;
        log::info!("Closed room {}", handle.code());
        Ok(())
    }

    /// Get active room count
    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }

    async fn after_departure(&self, handle: &RoomHandle, departure: Departure) {
        if departure.remaining == 0 {
            self.remove_room(handle.code(), handle.instance()).await;
            log::info!("Room {} emptied and was removed", handle.code());
        }
    }

    async fn remove_room(&self, code: &str, instance: Uuid) {
        forget_room(&self.rooms, &self.memberships, code, instance, &[]).await;
    }
}

/// Drop a room from the registry if `instance` is still the registered room
/// under `code`, and unseat anyone left behind.
async fn forget_room(
    rooms: &RoomMap,
    memberships: &MembershipMap,
    code: &str,
    instance: Uuid,
    stranded: &[PlayerId],
) {
    let mut rooms = rooms.write().await;
    if rooms.get(code).is_some_and(|handle| handle.instance() == instance) {
        rooms.remove(code);
    }
    drop(rooms);

    if stranded.is_empty() {
        return;
    }
    let mut memberships = memberships.write().await;
    for player_id in stranded {
        if memberships.get(player_id).map(String::as_str) == Some(code) {
            memberships.remove(player_id);
        }
    }
}

/// Round-trip a request to a room actor.
async fn request<T>(
    handle: &RoomHandle,
    build: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
) -> Result<T, GameError> {
    let (tx, rx) = oneshot::channel();
    handle
        .send(build(tx))
        .await
        .map_err(|_| GameError::RoomNotFound)?;
    rx.await.map_err(|_| GameError::RoomClosed)
}

/// Uppercase and check a user-supplied room code.
pub fn normalize_room_code(code: &str) -> Result<String, GameError> {
    let code = code.trim().to_ascii_uppercase();
    let valid_length = (MIN_ROOM_CODE_LENGTH..=MAX_ROOM_CODE_LENGTH).contains(&code.len());
    if !valid_length || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GameError::InvalidRoomCode);
    }
    Ok(code)
}

fn random_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Pick a code not already in use, lengthening it after repeated collisions.
fn unique_code(rooms: &HashMap<String, RoomHandle>) -> Result<String, GameError> {
    for len in MIN_ROOM_CODE_LENGTH..=MAX_ROOM_CODE_LENGTH {
        for _ in 0..ROOM_CODE_ATTEMPTS_PER_LENGTH {
            let code = random_code(len);
            if !rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        log::warn!("Room code space of length {len} is crowded, trying longer codes");
    }
    Err(GameError::TooManyRooms)
}
