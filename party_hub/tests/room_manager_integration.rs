//! Integration tests for the room registry.
//!
//! Rooms are spawned as real actors; players are plain channels standing in
//! for WebSocket connections.

use party_hub::{
    GameError, GameEvent, GameKind, GameView, PlayerId, RoomAction, RoomManager, RoomSettings,
    ServerMessage,
    game::{ActionOutcome, DisplayName, Roles, constants::OUTBOUND_QUEUE_SIZE},
    room::{Entrant, RoomConfig},
};
use std::time::Duration;
use tokio::{sync::mpsc, time::sleep};

struct TestPlayer {
    id: PlayerId,
    inbox: mpsc::Receiver<ServerMessage>,
    outbound: mpsc::Sender<ServerMessage>,
}

impl TestPlayer {
    fn new() -> Self {
        let (outbound, inbox) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        Self {
            id: PlayerId::new(),
            inbox,
            outbound,
        }
    }

    fn entrant(&self, name: &str) -> Entrant {
        Entrant {
            player_id: self.id,
            name: DisplayName::new(name),
            roles: Roles::default(),
            outbound: self.outbound.clone(),
        }
    }

    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.inbox.try_recv() {
            messages.push(message);
        }
        messages
    }

    fn last_snapshot(&mut self) -> Option<GameView> {
        self.drain().into_iter().rev().find_map(|m| match m {
            ServerMessage::StateSnapshot(view) => Some(view),
            _ => None,
        })
    }
}

fn manager() -> RoomManager {
    RoomManager::new(RoomSettings::default())
}

// === Codes ===

#[tokio::test]
async fn test_room_codes_are_unique_and_case_insensitive() {
    let manager = manager();
    let mut codes = Vec::new();
    let mut hosts = Vec::new();
    for _ in 0..50 {
        let host = TestPlayer::new();
        let code = manager
            .create_room(RoomConfig::new(GameKind::WildCard), host.entrant("host"))
            .await
            .unwrap();
        assert!((4..=6).contains(&code.len()));
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        codes.push(code);
        hosts.push(host);
    }
    let mut unique = codes.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), codes.len());
    assert_eq!(manager.room_count().await, 50);

    let guest = TestPlayer::new();
    let (code, game) = manager
        .join_room(&codes[0].to_lowercase(), guest.entrant("guest"), None)
        .await
        .unwrap();
    assert_eq!(code, codes[0]);
    assert_eq!(game, GameKind::WildCard);
}

#[tokio::test]
async fn test_unknown_and_malformed_codes() {
    let manager = manager();
    let player = TestPlayer::new();

    assert_eq!(
        manager.join_room("ZZZZ", player.entrant("p"), None).await,
        Err(GameError::RoomNotFound)
    );
    assert_eq!(
        manager.join_room("no!", player.entrant("p"), None).await,
        Err(GameError::InvalidRoomCode)
    );
    assert_eq!(
        manager.leave_room("ZZZZ", player.id).await,
        Err(GameError::NotInRoom)
    );
}

#[tokio::test]
async fn test_room_limit() {
    let manager = RoomManager::new(RoomSettings {
        max_rooms: 2,
        ..RoomSettings::default()
    });
    let players: Vec<TestPlayer> = (0..3).map(|_| TestPlayer::new()).collect();

    for player in &players[..2] {
        manager
            .create_room(RoomConfig::new(GameKind::WildCard), player.entrant("p"))
            .await
            .unwrap();
    }
    assert_eq!(
        manager
            .create_room(RoomConfig::new(GameKind::WildCard), players[2].entrant("p"))
            .await,
        Err(GameError::TooManyRooms)
    );
}

// === Membership ===

#[tokio::test]
async fn test_one_room_per_player() {
    let manager = manager();
    let alice = TestPlayer::new();
    let bob = TestPlayer::new();

    let first = manager
        .create_room(RoomConfig::new(GameKind::WildCard), alice.entrant("alice"))
        .await
        .unwrap();
    let second = manager
        .create_room(RoomConfig::new(GameKind::AwfulAnswers), bob.entrant("bob"))
        .await
        .unwrap();

    assert_eq!(
        manager.join_room(&first, alice.entrant("alice"), None).await,
        Err(GameError::AlreadyJoined)
    );
    assert_eq!(
        manager.join_room(&second, alice.entrant("alice"), None).await,
        Err(GameError::AlreadyInRoom)
    );
    assert_eq!(
        manager
            .create_room(RoomConfig::new(GameKind::WildCard), alice.entrant("alice"))
            .await,
        Err(GameError::AlreadyInRoom)
    );
    assert_eq!(manager.room_for(&alice.id).await, Some(first));
}

#[tokio::test]
async fn test_secret_rooms() {
    let manager = manager();
    let host = TestPlayer::new();
    let guest = TestPlayer::new();
    let config = RoomConfig::new(GameKind::AwfulAnswers)
        .with_capacity(6)
        .with_secret("hunter2")
        .unwrap();

    let code = manager.create_room(config, host.entrant("host")).await.unwrap();

    assert_eq!(
        manager.join_room(&code, guest.entrant("guest"), None).await,
        Err(GameError::BadSecret)
    );
    assert_eq!(
        manager
            .join_room(&code, guest.entrant("guest"), Some("wrong".into()))
            .await,
        Err(GameError::BadSecret)
    );
    manager
        .join_room(&code, guest.entrant("guest"), Some("hunter2".into()))
        .await
        .unwrap();

    let listed = manager.list_public_rooms().await;
    assert_eq!(listed.len(), 1);
    assert!(listed[0].has_secret);
    assert_eq!(listed[0].occupancy, 2);
    assert_eq!(listed[0].capacity, 6);
}

#[tokio::test]
async fn test_full_room_rejects_joins() {
    let manager = manager();
    let players: Vec<TestPlayer> = (0..3).map(|_| TestPlayer::new()).collect();
    let code = manager
        .create_room(
            RoomConfig::new(GameKind::WildCard).with_capacity(2),
            players[0].entrant("a"),
        )
        .await
        .unwrap();

    manager
        .join_room(&code, players[1].entrant("b"), None)
        .await
        .unwrap();
    assert_eq!(
        manager.join_room(&code, players[2].entrant("c"), None).await,
        Err(GameError::RoomFull)
    );
    assert_eq!(manager.room_for(&players[2].id).await, None);
}

#[tokio::test]
async fn test_wildcard_rejects_late_join_awful_accepts() {
    let manager = manager();
    let wild_players: Vec<TestPlayer> = (0..3).map(|_| TestPlayer::new()).collect();
    let wild = manager
        .create_room(RoomConfig::new(GameKind::WildCard), wild_players[0].entrant("a"))
        .await
        .unwrap();
    manager
        .join_room(&wild, wild_players[1].entrant("b"), None)
        .await
        .unwrap();
    manager
        .act(&wild, wild_players[0].id, RoomAction::Start)
        .await
        .unwrap();
    assert_eq!(
        manager.join_room(&wild, wild_players[2].entrant("c"), None).await,
        Err(GameError::AlreadyStarted)
    );

    let awful_players: Vec<TestPlayer> = (0..5).map(|_| TestPlayer::new()).collect();
    let awful = manager
        .create_room(
            RoomConfig::new(GameKind::AwfulAnswers),
            awful_players[0].entrant("a"),
        )
        .await
        .unwrap();
    for player in &awful_players[1..4] {
        manager.join_room(&awful, player.entrant("p"), None).await.unwrap();
    }
    manager
        .act(&awful, awful_players[0].id, RoomAction::Start)
        .await
        .unwrap();
    manager
        .join_room(&awful, awful_players[4].entrant("late"), None)
        .await
        .unwrap();

    let view = manager.view(&awful, awful_players[4].id).await.unwrap();
    let Some(GameView::AwfulAnswers(view)) = view else {
        panic!("expected an Awful Answers view");
    };
    assert!(view.started);
    assert_eq!(view.hand.len(), 10);
}

#[tokio::test]
async fn test_empty_room_is_destroyed() {
    let manager = manager();
    let alice = TestPlayer::new();
    let bob = TestPlayer::new();
    let code = manager
        .create_room(RoomConfig::new(GameKind::WildCard), alice.entrant("alice"))
        .await
        .unwrap();
    manager.join_room(&code, bob.entrant("bob"), None).await.unwrap();

    manager.leave_room(&code, alice.id).await.unwrap();
    assert_eq!(manager.room_count().await, 1);
    let summary = &manager.list_public_rooms().await[0];
    assert_eq!(summary.host_name.as_ref().map(|n| n.as_str()), Some("bob"));

    assert_eq!(manager.handle_disconnect(bob.id).await, Some(code.clone()));
    assert_eq!(manager.room_count().await, 0);
    assert!(manager.get_room(&code).await.is_none());
    assert_eq!(manager.room_for(&bob.id).await, None);
    assert_eq!(manager.handle_disconnect(bob.id).await, None);
}

#[tokio::test]
async fn test_dropped_connection_stops_receiving() {
    let manager = manager();
    let alice = TestPlayer::new();
    let mut bob = TestPlayer::new();
    let code = manager
        .create_room(RoomConfig::new(GameKind::WildCard), alice.entrant("alice"))
        .await
        .unwrap();
    manager.join_room(&code, bob.entrant("bob"), None).await.unwrap();
    bob.drain();

    // Alice's socket goes away without a leave; fan-out keeps working for Bob.
    drop(alice);
    let carol = TestPlayer::new();
    manager.join_room(&code, carol.entrant("carol"), None).await.unwrap();

    let messages = bob.drain();
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::GameEvent(GameEvent::PlayerJoined { player_id, .. }) if *player_id == carol.id
    )));
}

// === Moderation ===

#[tokio::test]
async fn test_kick_removes_and_notifies() {
    let manager = manager();
    let mut host = TestPlayer::new();
    let mut target = TestPlayer::new();
    let code = manager
        .create_room(RoomConfig::new(GameKind::WildCard), host.entrant("host"))
        .await
        .unwrap();
    manager
        .join_room(&code, target.entrant("target"), None)
        .await
        .unwrap();
    host.drain();
    target.drain();

    manager.kick(&code, target.id).await.unwrap();

    let target_id = target.id;
    let kicked = |messages: Vec<ServerMessage>| {
        messages.into_iter().any(|m| {
            matches!(m, ServerMessage::GameEvent(GameEvent::Kicked { player_id, .. }) if player_id == target_id)
        })
    };
    assert!(kicked(target.drain()));
    assert!(kicked(host.drain()));
    assert_eq!(manager.room_for(&target.id).await, None);
    assert_eq!(
        manager.kick(&code, target.id).await,
        Err(GameError::PlayerNotFound)
    );
}

#[tokio::test]
async fn test_close_room_unseats_everyone() {
    let manager = manager();
    let mut alice = TestPlayer::new();
    let bob = TestPlayer::new();
    let code = manager
        .create_room(RoomConfig::new(GameKind::WildCard), alice.entrant("alice"))
        .await
        .unwrap();
    manager.join_room(&code, bob.entrant("bob"), None).await.unwrap();

    manager.close_room(&code).await.unwrap();

    assert!(
        alice
            .drain()
            .contains(&ServerMessage::GameEvent(GameEvent::RoomClosed))
    );
    assert_eq!(manager.room_count().await, 0);
    assert_eq!(manager.room_for(&alice.id).await, None);
    assert_eq!(manager.room_for(&bob.id).await, None);
}

// === Actions ===

#[tokio::test]
async fn test_actions_need_membership() {
    let manager = manager();
    let alice = TestPlayer::new();
    let outsider = TestPlayer::new();
    let code = manager
        .create_room(RoomConfig::new(GameKind::WildCard), alice.entrant("alice"))
        .await
        .unwrap();

    assert_eq!(
        manager.act(&code, outsider.id, RoomAction::Draw).await,
        Err(GameError::NotInRoom)
    );
    assert_eq!(
        manager.act(&code, alice.id, RoomAction::Start).await,
        Err(GameError::NotEnoughPlayers { needed: 2, have: 1 })
    );
}

#[tokio::test]
async fn test_start_broadcasts_private_snapshots() {
    let manager = manager();
    let mut alice = TestPlayer::new();
    let mut bob = TestPlayer::new();
    let code = manager
        .create_room(RoomConfig::new(GameKind::WildCard), alice.entrant("alice"))
        .await
        .unwrap();
    manager.join_room(&code, bob.entrant("bob"), None).await.unwrap();

    let outcome = manager.act(&code, alice.id, RoomAction::Start).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Applied);

    let Some(GameView::WildCard(alice_view)) = alice.last_snapshot() else {
        panic!("alice gets a snapshot");
    };
    let Some(GameView::WildCard(bob_view)) = bob.last_snapshot() else {
        panic!("bob gets a snapshot");
    };
    assert!(alice_view.started && bob_view.started);
    assert_ne!(alice_view.hand, bob_view.hand);
    assert_eq!(
        alice_view.players[1].card_count,
        bob_view.hand.len(),
        "alice sees only the size of bob's hand"
    );
}

// === Teardown ===

#[tokio::test]
async fn test_finished_awful_room_tears_down() {
    let manager = RoomManager::new(RoomSettings {
        teardown_delay: Duration::from_millis(50),
        awful_win_score: 1,
        ..RoomSettings::default()
    });
    let mut players: Vec<TestPlayer> = (0..4).map(|_| TestPlayer::new()).collect();
    let code = manager
        .create_room(
            RoomConfig::new(GameKind::AwfulAnswers),
            players[0].entrant("p0"),
        )
        .await
        .unwrap();
    for (i, player) in players.iter().enumerate().skip(1) {
        manager
            .join_room(&code, player.entrant(&format!("p{i}")), None)
            .await
            .unwrap();
    }
    manager
        .act(&code, players[0].id, RoomAction::Start)
        .await
        .unwrap();

    // The first seat judges the first round.
    let judge = players[0].id;
    for player in &players[1..] {
        let Some(GameView::AwfulAnswers(view)) = manager.view(&code, player.id).await.unwrap()
        else {
            panic!("expected an Awful Answers view");
        };
        let pick = view.prompt.unwrap().pick;
        manager
            .act(
                &code,
                player.id,
                RoomAction::Submit {
                    card_indexes: (0..pick).collect(),
                },
            )
            .await
            .unwrap();
    }
    let Some(GameView::AwfulAnswers(view)) = manager.view(&code, judge).await.unwrap() else {
        panic!("expected an Awful Answers view");
    };
    let submission = view.revealed.expect("judge sees the answers")[0].submission_id;
    let outcome = manager
        .act(&code, judge, RoomAction::SelectWinner { submission })
        .await
        .unwrap();
    let ActionOutcome::GameOver { game, winner, .. } = &outcome else {
        panic!("a single point wins, got {outcome:?}");
    };
    assert_eq!(*game, GameKind::AwfulAnswers);
    assert!(players[1..].iter().any(|p| p.id == *winner));
    assert_eq!(manager.room_count().await, 1, "the room lingers briefly");

    sleep(Duration::from_millis(300)).await;

    assert_eq!(manager.room_count().await, 0);
    for player in &mut players {
        assert_eq!(manager.room_for(&player.id).await, None);
        assert!(
            player
                .drain()
                .contains(&ServerMessage::GameEvent(GameEvent::RoomClosed))
        );
    }
}
