//! Command dispatch for connected clients.
//!
//! The hub sits between a transport and the room registry: it checks the
//! capability policy once per command, resolves logins and display names
//! through its collaborators, and maps everything else onto
//! [`RoomManager`] calls. Failures are reported to the originating
//! connection only.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    auth::{
        AuthError, Authenticator, BlacklistFilter, Capability, InMemoryAccounts, InMemoryStats,
        LeaderboardEntry, NameFilter, Standing, StatsRecorder, generate_guest_name,
        is_permitted,
    },
    game::{
        ActionOutcome, DisplayName, GameError, GameKind, PlayerId, Roles,
        constants::DEFAULT_CAPACITY,
    },
    net::messages::{ClientCommand, ServerMessage},
    room::{Entrant, RoomConfig, RoomManager, RoomSettings, RoomSummary},
};

/// Hub-wide settings
#[derive(Debug, Clone)]
pub struct HubSettings {
    pub rooms: RoomSettings,
    /// Capacity for `createRoom` commands that don't name one
    pub default_capacity: usize,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            rooms: RoomSettings::default(),
            default_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Per-connection state the hub reads and updates
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub player_id: PlayerId,
    pub display_name: DisplayName,
    /// Effective capability: the better of origin and login
    pub capability: Capability,
    /// Capability granted by the network origin alone
    pub origin_capability: Capability,
    pub outbound: mpsc::Sender<ServerMessage>,
}

impl ConnectionContext {
    pub fn new(outbound: mpsc::Sender<ServerMessage>, origin_capability: Capability) -> Self {
        Self {
            player_id: PlayerId::new(),
            display_name: DisplayName::new(&generate_guest_name()),
            capability: origin_capability,
            origin_capability,
            outbound,
        }
    }

    pub fn roles(&self) -> Roles {
        self.capability.roles()
    }

    fn entrant(&self) -> Entrant {
        Entrant {
            player_id: self.player_id,
            name: self.display_name.clone(),
            roles: self.roles(),
            outbound: self.outbound.clone(),
        }
    }

    async fn reply(&self, message: ServerMessage) {
        if self.outbound.send(message).await.is_err() {
            log::debug!("Connection {} closed before reply", self.player_id);
        }
    }
}

/// Dispatcher shared by every connection
#[derive(Clone)]
pub struct GameHub {
    settings: HubSettings,
    rooms: RoomManager,
    authenticator: Arc<dyn Authenticator>,
    stats: Arc<dyn StatsRecorder>,
    names: Arc<dyn NameFilter>,
}

impl GameHub {
    /// Create a hub backed by in-memory collaborators
    ///
    /// # Arguments
    ///
    /// * `settings` - Hub and room settings
    ///
    /// # Returns
    ///
    /// * `GameHub` - Hub with an empty account store and leaderboard
    pub fn new(settings: HubSettings) -> Self {
        Self {
            rooms: RoomManager::new(settings.rooms.clone()),
            settings,
            authenticator: Arc::new(InMemoryAccounts::new()),
            stats: Arc::new(InMemoryStats::new()),
            names: Arc::new(BlacklistFilter::default()),
        }
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn with_stats(mut self, stats: Arc<dyn StatsRecorder>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_name_filter(mut self, names: Arc<dyn NameFilter>) -> Self {
        self.names = names;
        self
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    /// Register a new connection and greet it
    ///
    /// # Arguments
    ///
    /// * `outbound` - Queue drained by the connection's writer
    /// * `origin_capability` - Capability granted by the peer address
    ///
    /// # Returns
    ///
    /// * `ConnectionContext` - State to pass back on every command
    pub async fn connect(
        &self,
        outbound: mpsc::Sender<ServerMessage>,
        origin_capability: Capability,
    ) -> ConnectionContext {
        let ctx = ConnectionContext::new(outbound, origin_capability);
        ctx.reply(ServerMessage::Welcome {
            player_id: ctx.player_id,
            display_name: ctx.display_name.clone(),
        })
        .await;
        ctx
    }

    /// Handle one command from a connection
    ///
    /// Rejections are sent back to the connection as `actionRejected` and also
    /// returned so the transport can count them. Commands that aren't room
    /// actions report `ActionOutcome::Applied`.
    pub async fn handle_command(
        &self,
        ctx: &mut ConnectionContext,
        command: ClientCommand,
    ) -> Result<ActionOutcome, GameError> {
        let result = if is_permitted(ctx.capability, &command) {
            self.dispatch(ctx, command).await
        } else {
            log::warn!(
                "Player {} ({}) attempted privileged command: {}",
                ctx.player_id,
                ctx.capability,
                command
            );
            Err(GameError::MissingCapability)
        };
        if let Err(e) = &result {
            ctx.reply(ServerMessage::rejected(e)).await;
        }
        result
    }

    /// Remove a dropped connection from its room
    pub async fn handle_disconnect(&self, ctx: &ConnectionContext) {
        if let Some(code) = self.rooms.handle_disconnect(ctx.player_id).await {
            log::info!("Player {} disconnected from room {}", ctx.player_id, code);
        }
    }

    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms.list_public_rooms().await
    }

    /// One page of the leaderboard for `game`, or overall when `None`
    pub async fn leaderboard(
        &self,
        game: Option<GameKind>,
        limit: usize,
        offset: usize,
    ) -> Vec<LeaderboardEntry> {
        self.stats.page(game, limit, offset).await
    }

    pub async fn search_leaderboard(
        &self,
        term: &str,
        game: Option<GameKind>,
        limit: usize,
    ) -> Vec<LeaderboardEntry> {
        self.stats.search(term, game, limit).await
    }

    pub async fn standing(&self, display_name: &str, game: Option<GameKind>) -> Option<Standing> {
        self.stats.standing(display_name, game).await
    }

    async fn dispatch(
        &self,
        ctx: &mut ConnectionContext,
        command: ClientCommand,
    ) -> Result<ActionOutcome, GameError> {
        match command {
            ClientCommand::CreateRoom {
                game,
                display_name,
                capacity,
                secret,
            } => {
                self.check_name(ctx, &display_name).await?;
                let mut config = RoomConfig::new(game)
                    .with_capacity(capacity.unwrap_or(self.settings.default_capacity));
                if let Some(secret) = secret {
                    config = config.with_secret(&secret)?;
                }
                config.validate()?;

                ctx.display_name = display_name;
                let room_code = self.rooms.create_room(config, ctx.entrant()).await?;
                ctx.reply(ServerMessage::RoomCreated { room_code, game }).await;
            }
            ClientCommand::JoinRoom {
                room_code,
                display_name,
                secret,
            } => {
                self.check_name(ctx, &display_name).await?;
                let previous = std::mem::replace(&mut ctx.display_name, display_name);
                match self.rooms.join_room(&room_code, ctx.entrant(), secret).await {
                    Ok((room_code, game)) => {
                        ctx.reply(ServerMessage::RoomJoined { room_code, game }).await;
                    }
                    Err(e) => {
                        ctx.display_name = previous;
                        return Err(e);
                    }
                }
            }
            ClientCommand::LeaveRoom { room_code } => {
                self.rooms.leave_room(&room_code, ctx.player_id).await?;
                ctx.reply(ServerMessage::RoomLeft {
                    room_code: room_code.trim().to_ascii_uppercase(),
                })
                .await;
            }
            ClientCommand::ListRooms => {
                let rooms = self.rooms.list_public_rooms().await;
                ctx.reply(ServerMessage::RoomList(rooms)).await;
            }
            ClientCommand::Login { username, password } => {
                self.login(ctx, &username, &password).await?;
            }
            ClientCommand::GuestLogin { username } => {
                self.guest_login(ctx, username).await;
            }
            ClientCommand::Register { username, password } => {
                self.register(ctx, &username, &password).await?;
            }
            ClientCommand::KickPlayer { room_code, target } => {
                self.rooms.kick(&room_code, target).await?;
                log::info!(
                    "Moderator {} kicked {} from {}",
                    ctx.player_id,
                    target,
                    room_code
                );
            }
            command => {
                let Some((room_code, action)) = command.into_room_action() else {
                    return Err(GameError::UnsupportedAction);
                };
                let outcome = self.rooms.act(&room_code, ctx.player_id, action).await?;
                if let ActionOutcome::GameOver { game, name, .. } = &outcome {
                    self.stats.record_win(name.as_str(), *game).await;
                }
                return Ok(outcome);
            }
        }
        Ok(ActionOutcome::Applied)
    }

    async fn login(
        &self,
        ctx: &mut ConnectionContext,
        username: &str,
        password: &str,
    ) -> Result<(), GameError> {
        match self.authenticator.authenticate(username, password).await {
            Ok(user) => {
                ctx.capability = ctx.origin_capability.max(user.capability);
                ctx.display_name = DisplayName::new(&user.username);
                log::info!("{} logged in as {}", user.username, ctx.capability);
                ctx.reply(ServerMessage::LoginResult {
                    success: true,
                    display_name: Some(ctx.display_name.clone()),
                    capability: ctx.capability,
                    message: None,
                })
                .await;
                Ok(())
            }
            Err(e) => {
                log::info!("Failed login for {username}: {e}");
                ctx.reply(ServerMessage::LoginResult {
                    success: false,
                    display_name: None,
                    capability: ctx.capability,
                    message: Some(e.client_message()),
                })
                .await;
                Err(GameError::AuthenticationFailed)
            }
        }
    }

    /// Create a player account. The connection stays as it was; the client
    /// logs in separately.
    async fn register(
        &self,
        ctx: &ConnectionContext,
        username: &str,
        password: &str,
    ) -> Result<(), GameError> {
        let result = if !ctx.capability.allows(Capability::Moderator)
            && self.names.is_name_disallowed(username.trim()).await
        {
            Err(AuthError::DisallowedName)
        } else {
            self.authenticator.register(username, password).await
        };

        match result {
            Ok(()) => {
                ctx.reply(ServerMessage::RegisterResult {
                    success: true,
                    message: "Account created successfully".to_string(),
                })
                .await;
                Ok(())
            }
            Err(e) => {
                log::info!("Registration rejected for {username}: {e}");
                let message = e.client_message();
                ctx.reply(ServerMessage::RegisterResult {
                    success: false,
                    message: message.clone(),
                })
                .await;
                Err(GameError::RegistrationFailed(message))
            }
        }
    }

    async fn guest_login(&self, ctx: &mut ConnectionContext, username: Option<String>) {
        let requested = username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        if let Some(name) = &requested
            && self.names.is_name_disallowed(name).await
        {
            ctx.reply(ServerMessage::LoginResult {
                success: false,
                display_name: None,
                capability: ctx.capability,
                message: Some(GameError::DisallowedName.to_string()),
            })
            .await;
            return;
        }

        ctx.capability = ctx.origin_capability;
        ctx.display_name = DisplayName::new(&requested.unwrap_or_else(generate_guest_name));
        ctx.reply(ServerMessage::LoginResult {
            success: true,
            display_name: Some(ctx.display_name.clone()),
            capability: ctx.capability,
            message: None,
        })
        .await;
    }

    /// Moderators may use reserved names, everyone else goes through the filter.
    async fn check_name(&self, ctx: &ConnectionContext, name: &DisplayName) -> Result<(), GameError> {
        if ctx.capability.allows(Capability::Moderator) {
            return Ok(());
        }
        if self.names.is_name_disallowed(name.as_str()).await {
            return Err(GameError::DisallowedName);
        }
        Ok(())
    }
}
