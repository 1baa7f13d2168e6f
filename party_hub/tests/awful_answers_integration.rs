//! Integration tests for Awful Answers rounds.
//!
//! Whole games are played through [`SessionRules`] with the judge role
//! rotating, custom card packs, and players arriving mid-game.

use party_hub::game::{
    ActionOutcome, DisplayName, GameError, GameEvent, GameKind, GameSession, PlayerId, Roles,
    RoomAction, SessionRules, SubmissionId,
    awful::{AnswerCard, AwfulAnswersGame, CardPack, CardPackError, RoundPhase},
    constants::AWFUL_HAND_SIZE,
    views::{AwfulView, GameView},
};

fn pack_json(pick: usize, answers: usize) -> String {
    let answers: Vec<String> = (0..answers).map(|i| format!("\"answer {i}\"")).collect();
    format!(
        r#"{{"prompts": ["A plain prompt", {{"text": "____ and ____", "pick": {pick}}}], "answers": [{}]}}"#,
        answers.join(", ")
    )
}

fn seat(session: &mut GameSession, n: usize) -> Vec<PlayerId> {
    let ids: Vec<PlayerId> = (0..n).map(|_| PlayerId::new()).collect();
    for (i, id) in ids.iter().enumerate() {
        session
            .add_player(*id, DisplayName::new(&format!("player{i}")), Roles::default())
            .unwrap();
    }
    ids
}

fn view(session: &GameSession, id: &PlayerId) -> AwfulView {
    match session.view_for(id) {
        Some(GameView::AwfulAnswers(view)) => view,
        other => panic!("expected an Awful Answers view, got {other:?}"),
    }
}

fn judge_of(session: &GameSession, ids: &[PlayerId]) -> PlayerId {
    *ids.iter()
        .find(|id| view(session, id).is_judge)
        .expect("a round always has a judge")
}

/// The first cards of `id`'s hand, as many as the prompt asks for.
fn answer(session: &GameSession, id: &PlayerId) -> RoomAction {
    let pick = view(session, id).prompt.unwrap().pick;
    RoomAction::Submit {
        card_indexes: (0..pick).collect(),
    }
}

/// Every non-judge submits. Returns who played which cards.
fn submit_all(
    session: &mut GameSession,
    ids: &[PlayerId],
    judge: &PlayerId,
) -> Vec<(PlayerId, Vec<AnswerCard>)> {
    let mut played = Vec::new();
    for id in ids.iter().filter(|id| *id != judge) {
        let before = view(session, id);
        let pick = before.prompt.unwrap().pick;
        played.push((*id, before.hand[..pick].to_vec()));
        let action = answer(session, id);
        session.apply(id, action).unwrap();
    }
    played
}

/// The handle the judge sees for the answer `author` played.
fn handle_for(
    session: &GameSession,
    judge: &PlayerId,
    played: &[(PlayerId, Vec<AnswerCard>)],
    author: &PlayerId,
) -> SubmissionId {
    let (_, cards) = played.iter().find(|(id, _)| id == author).unwrap();
    view(session, judge)
        .revealed
        .unwrap()
        .into_iter()
        .find(|answer| &answer.cards == cards)
        .expect("every submission is revealed")
        .submission_id
}

// === Whole Games ===

#[test]
fn test_game_runs_to_win_score() {
    let win_score = 3;
    let mut session = GameSession::new(
        GameKind::AwfulAnswers,
        "AWFL",
        10,
        &CardPack::builtin(),
        win_score,
    );
    let ids = seat(&mut session, 4);
    session.apply(&ids[0], RoomAction::Start).unwrap();

    let mut judges = Vec::new();
    let mut champion = None;
    for _ in 0..50 {
        let judge = judge_of(&session, &ids);
        judges.push(judge);
        let played = submit_all(&mut session, &ids, &judge);

        for id in &ids {
            let mine = view(&session, id);
            assert_eq!(mine.round_phase, Some(RoundPhase::Judging));
            assert_eq!(mine.hand.len(), AWFUL_HAND_SIZE);
            assert_eq!(mine.revealed.is_some(), *id == judge);
        }

        // The judge always favors the player who sits after them.
        let revealed = view(&session, &judge).revealed.unwrap();
        assert_eq!(revealed.len(), ids.len() - 1);
        let judge_seat = ids.iter().position(|id| *id == judge).unwrap();
        let favorite = ids[(judge_seat + 1) % ids.len()];
        assert!(
            revealed
                .iter()
                .all(|answer| !ids.iter().any(|id| id.0 == answer.submission_id.0)),
            "handles never expose who answered"
        );
        let submission = handle_for(&session, &judge, &played, &favorite);

        match session
            .apply(&judge, RoomAction::SelectWinner { submission })
            .unwrap()
        {
            ActionOutcome::GameOver { winner, .. } => {
                champion = Some(winner);
                break;
            }
            outcome => assert_eq!(outcome, ActionOutcome::Applied),
        }

        let after = view(&session, &favorite);
        assert_eq!(after.round_phase, Some(RoundPhase::RoundOver));
        assert_eq!(after.last_round.unwrap().winner, favorite);
        // Anyone in the room may move things along.
        session.apply(&favorite, RoomAction::NextRound).unwrap();
    }

    let champion = champion.expect("someone reaches the win score");
    let final_view = view(&session, &champion);
    assert_eq!(final_view.winner, Some(champion));
    assert!(!final_view.started);
    let top = final_view.players.iter().find(|p| p.id == champion).unwrap();
    assert_eq!(top.score, win_score);

    // The judge role walks around the table one seat per round.
    for pair in judges.windows(2) {
        let a = ids.iter().position(|id| *id == pair[0]).unwrap();
        let b = ids.iter().position(|id| *id == pair[1]).unwrap();
        assert_eq!(b, (a + 1) % ids.len());
    }
}

#[test]
fn test_restart_after_game_over_clears_scores() {
    let mut session = GameSession::new(
        GameKind::AwfulAnswers,
        "AWFL",
        10,
        &CardPack::builtin(),
        1,
    );
    let ids = seat(&mut session, 4);
    session.apply(&ids[0], RoomAction::Start).unwrap();

    let judge = judge_of(&session, &ids);
    let played = submit_all(&mut session, &ids, &judge);
    let winner = *ids.iter().find(|id| **id != judge).unwrap();
    let submission = handle_for(&session, &judge, &played, &winner);
    let outcome = session
        .apply(&judge, RoomAction::SelectWinner { submission })
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::GameOver { winner: w, .. } if w == winner));

    session.apply(&ids[0], RoomAction::Start).unwrap();
    let fresh = view(&session, &winner);
    assert!(fresh.started);
    assert!(fresh.players.iter().all(|p| p.score == 0));
    assert!(fresh.last_round.is_none());
}

// === Rounds ===

#[test]
fn test_pick_two_keeps_submission_order() {
    let pack = CardPack::from_json(&pack_json(2, 60)).unwrap();
    let mut game = AwfulAnswersGame::with_seed("PICK", 10, pack, 4);
    let ids: Vec<PlayerId> = (0..4).map(|_| PlayerId::new()).collect();
    for id in &ids {
        game.add_player(*id, DisplayName::new("p"), Roles::default())
            .unwrap();
    }
    game.start().unwrap();

    // Skip rounds until the pick-two prompt comes up.
    for _ in 0..10 {
        if game.prompt().unwrap().pick == 2 {
            break;
        }
        game.skip_turn().unwrap();
    }
    assert_eq!(game.prompt().unwrap().pick, 2);

    let judge = game.judge().unwrap();
    let submitter = *ids.iter().find(|id| **id != judge).unwrap();
    assert_eq!(
        game.submit_answer(&submitter, &[0]),
        Err(GameError::InvalidSelection { expected: 2 })
    );
    assert_eq!(
        game.submit_answer(&submitter, &[3, 3]),
        Err(GameError::InvalidSelection { expected: 2 })
    );

    let hand = game.hand(&submitter).unwrap().to_vec();
    game.submit_answer(&submitter, &[4, 1]).unwrap();
    assert_eq!(
        game.submission(&submitter).unwrap(),
        &[hand[4].clone(), hand[1].clone()]
    );
    assert_eq!(game.hand(&submitter).unwrap().len(), AWFUL_HAND_SIZE);
}

#[test]
fn test_late_joiner_is_dealt_in_and_must_answer() {
    let mut session = GameSession::new(
        GameKind::AwfulAnswers,
        "LATE",
        10,
        &CardPack::builtin(),
        7,
    );
    let mut ids = seat(&mut session, 4);
    session.apply(&ids[0], RoomAction::Start).unwrap();
    let judge = judge_of(&session, &ids);

    let originals = ids.clone();
    let played = submit_all(&mut session, &originals, &judge);
    assert_eq!(
        view(&session, &judge).round_phase,
        Some(RoundPhase::Judging)
    );
    let submission = handle_for(&session, &judge, &played, &ids[1]);
    session
        .apply(&judge, RoomAction::SelectWinner { submission })
        .unwrap();
    session.apply(&judge, RoomAction::NextRound).unwrap();

    let latecomer = PlayerId::new();
    session
        .add_player(latecomer, DisplayName::new("late"), Roles::default())
        .unwrap();
    ids.push(latecomer);

    let fresh = view(&session, &latecomer);
    assert_eq!(fresh.hand.len(), AWFUL_HAND_SIZE);
    assert!(!fresh.is_judge);
    assert_eq!(fresh.submissions_needed, 4);

    let judge = judge_of(&session, &ids);
    for id in originals.iter().filter(|id| **id != judge) {
        let action = answer(&session, id);
        session.apply(id, action).unwrap();
    }
    assert_eq!(
        view(&session, &judge).round_phase,
        Some(RoundPhase::Submitting),
        "the latecomer still owes an answer"
    );
    let action = answer(&session, &latecomer);
    session.apply(&latecomer, action).unwrap();
    assert_eq!(view(&session, &judge).revealed.unwrap().len(), 4);
}

#[test]
fn test_round_rules_are_enforced() {
    let mut session = GameSession::new(
        GameKind::AwfulAnswers,
        "RULE",
        10,
        &CardPack::builtin(),
        7,
    );
    let ids = seat(&mut session, 4);
    assert_eq!(
        session.apply(&ids[0], RoomAction::Start),
        Ok(ActionOutcome::Applied)
    );
    let judge = judge_of(&session, &ids);
    let player = *ids.iter().find(|id| **id != judge).unwrap();

    assert_eq!(
        session.apply(&judge, RoomAction::Submit { card_indexes: vec![0] }),
        Err(GameError::JudgeCannotSubmit)
    );
    assert_eq!(
        session.apply(
            &judge,
            RoomAction::SelectWinner {
                submission: SubmissionId(player.0)
            }
        ),
        Err(GameError::NotJudging)
    );
    assert_eq!(
        session.apply(&player, RoomAction::NextRound),
        Err(GameError::RoundInProgress)
    );
    let action = answer(&session, &player);
    session.apply(&player, action).unwrap();
    assert_eq!(
        session.apply(&player, RoomAction::Submit { card_indexes: vec![1] }),
        Err(GameError::AlreadySubmitted)
    );
    assert_eq!(
        session.apply(&player, RoomAction::Draw),
        Err(GameError::UnsupportedAction)
    );

    // Submissions are announced to everyone without their contents.
    let events: Vec<GameEvent> = session.drain_events().into_iter().map(|n| n.event).collect();
    assert!(events.contains(&GameEvent::AnswerSubmitted { player_id: player }));
}

#[test]
fn test_skip_turn_hands_judging_to_next_seat() {
    let mut session = GameSession::new(
        GameKind::AwfulAnswers,
        "SKIP",
        10,
        &CardPack::builtin(),
        7,
    );
    let ids = seat(&mut session, 5);
    session.apply(&ids[0], RoomAction::Start).unwrap();
    let before = judge_of(&session, &ids);
    let submitter = *ids.iter().find(|id| **id != before).unwrap();
    let action = answer(&session, &submitter);
    session.apply(&submitter, action).unwrap();

    session.apply(&ids[2], RoomAction::SkipTurn).unwrap();

    let after = judge_of(&session, &ids);
    let a = ids.iter().position(|id| *id == before).unwrap();
    let b = ids.iter().position(|id| *id == after).unwrap();
    assert_eq!(b, (a + 1) % ids.len());
    let fresh = view(&session, &submitter);
    assert_eq!(fresh.round_phase, Some(RoundPhase::Submitting));
    assert_eq!(fresh.submissions_received, 0);
}

// === Card Packs ===

#[test]
fn test_card_pack_from_file() {
    let path = std::env::temp_dir().join(format!("awful-pack-{}.json", PlayerId::new()));
    std::fs::write(&path, pack_json(1, 45)).unwrap();

    let pack = CardPack::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(pack.prompts.len(), 2);
    assert_eq!(pack.answers.len(), 45);
    assert!(pack.prompts.iter().all(|p| p.pick == 1));
}

#[test]
fn test_card_pack_rejects_thin_packs() {
    assert!(matches!(
        CardPack::from_json(&pack_json(1, 10)),
        Err(CardPackError::NotEnoughAnswers { have: 10, .. })
    ));
    assert!(matches!(
        CardPack::from_json(r#"{"prompts": [], "answers": []}"#),
        Err(CardPackError::NoPrompts)
    ));
    assert!(matches!(
        CardPack::from_json(&pack_json(0, 60)),
        Err(CardPackError::InvalidPick(_))
    ));
    assert!(matches!(
        CardPack::from_json("not json"),
        Err(CardPackError::Json(_))
    ));
}

#[test]
fn test_card_pack_accepts_classic_field_names() {
    let answers: Vec<String> = (0..40).map(|i| format!("\"white {i}\"")).collect();
    let json = format!(
        r#"{{"blackCards": ["Why?"], "whiteCards": [{}]}}"#,
        answers.join(",")
    );

    let pack = CardPack::from_json(&json).unwrap();

    assert_eq!(pack.prompts[0].text, "Why?");
    assert_eq!(pack.answers.len(), 40);
}
