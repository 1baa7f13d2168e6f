//! Room actor: the single writer of one room's session.

use std::collections::HashMap;

use tokio::{
    sync::mpsc,
    time::{Duration, Instant, sleep_until},
};
use uuid::Uuid;

use super::{
    config::RoomConfig,
    messages::{Departure, RoomMessage, RoomSummary},
};
use crate::{
    game::{
        ActionOutcome, DisplayName, GameError, GameEvent, GameKind, GameSession, Notice, PlayerId,
        RoomAction, Roles, SessionRules, constants::ROOM_INBOX_SIZE,
    },
    net::messages::ServerMessage,
};

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    code: String,
    instance: Uuid,
}

impl RoomHandle {
    /// Create a new room handle
    pub fn new(sender: mpsc::Sender<RoomMessage>, code: String) -> Self {
        Self {
            sender,
            code,
            instance: Uuid::new_v4(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Distinguishes this room from a later room that reuses its code.
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Room is closed".to_string())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Fan-out target for one seated player
struct Member {
    outbound: mpsc::Sender<ServerMessage>,
    /// Messages lost to a full queue since the last snapshot got through
    dropped: usize,
}

/// Room actor owning a single game session
pub struct RoomActor {
    code: String,
    config: RoomConfig,
    session: GameSession,
    inbox: mpsc::Receiver<RoomMessage>,

    /// Outbound queue of every seated player
    members: HashMap<PlayerId, Member>,

    /// Delay between a decisive Awful Answers win and the room closing
    teardown_delay: Duration,
    teardown_at: Option<Instant>,
    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Arguments
    ///
    /// * `code` - Room code, already normalized
    /// * `config` - Room configuration
    /// * `session` - Freshly created game session for the room
    /// * `teardown_delay` - Grace period before a finished Awful Answers room closes
    ///
    /// # Returns
    ///
    /// * `(RoomActor, RoomHandle)` - Actor and handle for sending messages
    pub fn new(
        code: String,
        config: RoomConfig,
        session: GameSession,
        teardown_delay: Duration,
    ) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(ROOM_INBOX_SIZE);
        let handle = RoomHandle::new(sender, code.clone());
        let actor = Self {
            code,
            config,
            session,
            inbox,
            members: HashMap::new(),
            teardown_delay,
            teardown_at: None,
            is_closed: false,
        };
        (actor, handle)
    }

    /// Run the room actor event loop. Returns the players still seated when
    /// the room shut down.
    pub async fn run(mut self) -> Vec<PlayerId> {
        log::info!("Room {} ({}) opened", self.code, self.session.kind());

        loop {
            let teardown_at = self.teardown_at;
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    self.resync();
                    self.handle_message(message);
                    if self.is_closed {
                        break;
                    }
                }

                _ = sleep_until(teardown_at.unwrap_or_else(Instant::now)), if teardown_at.is_some() => {
                    log::info!("Room {} tearing down after game over", self.code);
                    self.close();
                    break;
                }
            }
        }

        log::info!("Room {} closed", self.code);
        self.members.keys().copied().collect()
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join {
                player_id,
                name,
                roles,
                secret,
                outbound,
                response,
            } => {
                let result = self.handle_join(player_id, name, roles, secret.as_deref(), outbound);
                let _ = response.send(result);
            }

            RoomMessage::Leave {
                player_id,
                response,
            } => {
                let result = self.handle_leave(player_id, None);
                let _ = response.send(result);
            }

            RoomMessage::Kick { target, response } => {
                let result = match self.session.player_name(&target) {
                    Some(name) => self.handle_leave(
                        target,
                        Some(GameEvent::Kicked {
                            player_id: target,
                            name,
                        }),
                    ),
                    None => Err(GameError::PlayerNotFound),
                };
                let _ = response.send(result);
            }

            RoomMessage::Action {
                player_id,
                action,
                response,
            } => {
                let result = self.handle_action(player_id, action);
                let _ = response.send(result);
            }

            RoomMessage::GetSummary { response } => {
                let _ = response.send(self.summary());
            }

            RoomMessage::GetView {
                player_id,
                response,
            } => {
                let _ = response.send(self.session.view_for(&player_id));
            }

            RoomMessage::Close { response } => {
                let members = self.members.keys().copied().collect();
                self.close();
                let _ = response.send(members);
            }
        }
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: DisplayName,
        roles: Roles,
        secret: Option<&str>,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Result<GameKind, GameError> {
        if self.session.contains(&player_id) {
            return Err(GameError::AlreadyJoined);
        }
        self.config.verify_secret(secret)?;
        if self.session.is_started() && !self.session.allows_late_join() {
            return Err(GameError::AlreadyStarted);
        }
        self.session.add_player(player_id, name, roles)?;
        self.members.insert(
            player_id,
            Member {
                outbound,
                dropped: 0,
            },
        );
        log::debug!("Player {} joined room {}", player_id, self.code);
        self.broadcast();
        Ok(self.session.kind())
    }

    /// Remove a player. `announcement` is sent to everyone, the departing
    /// player included, before they are dropped from the fan-out.
    fn handle_leave(
        &mut self,
        player_id: PlayerId,
        announcement: Option<GameEvent>,
    ) -> Result<Departure, GameError> {
        if !self.session.contains(&player_id) {
            return Err(GameError::NotInRoom);
        }
        if let Some(event) = announcement {
            self.notify(&Notice::everyone(event));
        }
        self.session.remove_player(&player_id)?;
        self.members.remove(&player_id);
        log::debug!("Player {} left room {}", player_id, self.code);

        let remaining = self.session.player_count();
        if remaining == 0 {
            self.session.drain_events();
            self.is_closed = true;
        } else {
            self.broadcast();
        }
        Ok(Departure { remaining })
    }

    fn handle_action(
        &mut self,
        player_id: PlayerId,
        action: RoomAction,
    ) -> Result<ActionOutcome, GameError> {
        let restarts = matches!(
            action,
            RoomAction::Start | RoomAction::ForceStart | RoomAction::Reset | RoomAction::EndGame
        );
        let outcome = self.session.apply(&player_id, action)?;
        if restarts {
            self.teardown_at = None;
        }
        if let ActionOutcome::GameOver { winner, .. } = &outcome {
            log::info!("Room {} game over, winner {}", self.code, winner);
            if self.session.kind() == GameKind::AwfulAnswers {
                self.teardown_at = Some(Instant::now() + self.teardown_delay);
            }
        }
        self.broadcast();
        Ok(outcome)
    }

    fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.code.clone(),
            game: self.session.kind(),
            host_name: self
                .session
                .host()
                .and_then(|host| self.session.player_name(&host)),
            occupancy: self.session.player_count(),
            capacity: self.session.capacity(),
            started: self.session.is_started(),
            has_secret: self.config.has_secret(),
        }
    }

    fn close(&mut self) {
        self.notify(&Notice::everyone(GameEvent::RoomClosed));
        self.is_closed = true;
    }

    /// Fan out pending events, then a fresh snapshot to every member.
    fn broadcast(&mut self) {
        for notice in self.session.drain_events() {
            self.notify(&notice);
        }

        let session = &self.session;
        let code = &self.code;
        self.members.retain(|player_id, member| {
            let Some(view) = session.view_for(player_id) else {
                return true;
            };
            deliver(code, player_id, member, ServerMessage::StateSnapshot(view))
        });
    }

    /// Resend the current snapshot to members that lost messages, once their
    /// queue has room again.
    fn resync(&mut self) {
        let session = &self.session;
        let code = &self.code;
        self.members.retain(|player_id, member| {
            if member.dropped == 0 {
                return true;
            }
            let Some(view) = session.view_for(player_id) else {
                member.dropped = 0;
                return true;
            };
            deliver(code, player_id, member, ServerMessage::StateSnapshot(view))
        });
    }

    fn notify(&mut self, notice: &Notice) {
        let code = &self.code;
        self.members.retain(|player_id, member| {
            if !notice.audience.includes(player_id) {
                return true;
            }
            deliver(
                code,
                player_id,
                member,
                ServerMessage::GameEvent(notice.event.clone()),
            )
        });
    }
}

/// Queue a message without waiting. Returns whether the member's channel is
/// still open.
///
/// A full queue drops the message and marks the member as behind; the next
/// snapshot that fits brings them back up to date.
fn deliver(code: &str, player_id: &PlayerId, member: &mut Member, message: ServerMessage) -> bool {
    let is_snapshot = matches!(message, ServerMessage::StateSnapshot(_));
    match member.outbound.try_send(message) {
        Ok(()) => {
            if is_snapshot && member.dropped > 0 {
                log::info!(
                    "Room {code}: {player_id} caught up after {} dropped messages",
                    member.dropped
                );
                member.dropped = 0;
            }
            true
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            if member.dropped == 0 {
                log::warn!("Room {code}: outbound queue for {player_id} full, dropping messages");
            }
            member.dropped += 1;
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            log::debug!("Room {code}: {player_id} disconnected, removing from fan-out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        GameView,
        awful::CardPack,
        constants::{AWFUL_WIN_SCORE, OUTBOUND_QUEUE_SIZE},
    };
    use tokio::sync::oneshot;

    fn spawn_room(kind: GameKind) -> RoomHandle {
        let session = GameSession::new(kind, "TEST", 10, &CardPack::builtin(), AWFUL_WIN_SCORE);
        let (actor, handle) = RoomActor::new(
            "TEST".to_string(),
            RoomConfig::new(kind),
            session,
            Duration::from_secs(10),
        );
        tokio::spawn(actor.run());
        handle
    }

    async fn join(
        handle: &RoomHandle,
        name: &str,
    ) -> (PlayerId, mpsc::Receiver<ServerMessage>, Result<GameKind, GameError>) {
        let player_id = PlayerId::new();
        let (outbound, inbox) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Join {
                player_id,
                name: name.into(),
                roles: Roles::default(),
                secret: None,
                outbound,
                response: tx,
            })
            .await
            .unwrap();
        (player_id, inbox, rx.await.unwrap())
    }

    fn drain(inbox: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = inbox.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn test_join_broadcasts_event_and_snapshot() {
        let handle = spawn_room(GameKind::WildCard);
        let (_, mut first, result) = join(&handle, "ann").await;
        assert_eq!(result, Ok(GameKind::WildCard));
        let (second_id, _, _) = join(&handle, "ben").await;

        let messages = drain(&mut first);
        assert!(messages.iter().any(|m| matches!(
            m,
            ServerMessage::GameEvent(GameEvent::PlayerJoined { player_id, .. }) if *player_id == second_id
        )));
        let Some(ServerMessage::StateSnapshot(GameView::WildCard(view))) = messages.last() else {
            panic!("expected a trailing snapshot, got {messages:?}");
        };
        assert_eq!(view.players.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_action_sends_nothing() {
        let handle = spawn_room(GameKind::WildCard);
        let (host, mut inbox, _) = join(&handle, "ann").await;
        drain(&mut inbox);

        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Action {
                player_id: host,
                action: RoomAction::Start,
                response: tx,
            })
            .await
            .unwrap();
        assert_eq!(
            rx.await.unwrap(),
            Err(GameError::NotEnoughPlayers { needed: 2, have: 1 })
        );
        assert!(drain(&mut inbox).is_empty());
    }

    #[tokio::test]
    async fn test_last_leave_closes_room() {
        let handle = spawn_room(GameKind::WildCard);
        let (player, _inbox, _) = join(&handle, "ann").await;

        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Leave {
                player_id: player,
                response: tx,
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), Ok(Departure { remaining: 0 }));

        // The actor exits once empty, which closes its inbox.
        tokio::time::timeout(Duration::from_secs(1), async {
            while !handle.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_kick_notifies_target() {
        let handle = spawn_room(GameKind::AwfulAnswers);
        let (_, _host_inbox, _) = join(&handle, "ann").await;
        let (target, mut target_inbox, _) = join(&handle, "ben").await;
        drain(&mut target_inbox);

        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Kick {
                target,
                response: tx,
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), Ok(Departure { remaining: 1 }));
        assert!(drain(&mut target_inbox).iter().any(|m| matches!(
            m,
            ServerMessage::GameEvent(GameEvent::Kicked { player_id, .. }) if *player_id == target
        )));
    }

    #[tokio::test]
    async fn test_full_queue_catches_up_with_latest_snapshot() {
        let handle = spawn_room(GameKind::WildCard);
        let player_id = PlayerId::new();
        let (outbound, mut slow) = mpsc::channel(1);
        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Join {
                player_id,
                name: "ann".into(),
                roles: Roles::default(),
                secret: None,
                outbound,
                response: tx,
            })
            .await
            .unwrap();
        rx.await.unwrap().unwrap();

        // Ben's arrival doesn't fit in ann's queue.
        let (_, _ben_inbox, _) = join(&handle, "ben").await;
        assert_eq!(drain(&mut slow).len(), 1);

        // The next message to the room gives the actor a chance to resend.
        let summary = |handle: RoomHandle| async move {
            let (tx, rx) = oneshot::channel();
            handle
                .send(RoomMessage::GetSummary { response: tx })
                .await
                .unwrap();
            rx.await.unwrap()
        };
        summary(handle.clone()).await;
        let Some(ServerMessage::StateSnapshot(GameView::WildCard(view))) = slow.try_recv().ok()
        else {
            panic!("expected a fresh snapshot");
        };
        assert_eq!(view.players.len(), 2);

        // Once caught up nothing more is resent.
        summary(handle).await;
        assert!(drain(&mut slow).is_empty());
    }

    #[tokio::test]
    async fn test_summary_reports_host() {
        let handle = spawn_room(GameKind::AwfulAnswers);
        let (_, _inbox, _) = join(&handle, "ann").await;

        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::GetSummary { response: tx })
            .await
            .unwrap();
        let summary = rx.await.unwrap();
        assert_eq!(summary.host_name.as_ref().map(|n| n.as_str()), Some("ann"));
        assert_eq!(summary.occupancy, 1);
        assert!(!summary.started);
        assert!(!summary.has_secret);
    }
}
