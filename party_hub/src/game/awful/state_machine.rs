//! Awful Answers session: a rotating judge reads a prompt, everyone else
//! answers from their hand, and the judge picks the round winner.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

use super::cards::{AnswerCard, CardPack, PromptCard};
use crate::game::{
    constants::{AWFUL_HAND_SIZE, AWFUL_MIN_PLAYERS, AWFUL_MIN_TO_CONTINUE, AWFUL_WIN_SCORE},
    deck::Deck,
    errors::GameError,
    events::{GameEvent, Notice, RevealedAnswer, SubmissionId},
    player::{DisplayName, PlayerId, Roles, Seat},
    views::{AwfulPlayerView, AwfulView, GameView, RoundResult},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    /// Non-judges are choosing answers.
    Submitting,
    /// Every answer is in and the judge is choosing.
    Judging,
    /// A winner was picked; waiting for someone to start the next round.
    RoundOver,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AwfulPhase {
    Lobby,
    Playing(RoundPhase),
    GameOver { winner: PlayerId },
}

#[derive(Debug)]
struct AwfulPlayer {
    seat: Seat,
    hand: Vec<AnswerCard>,
    submission: Option<Vec<AnswerCard>>,
}

/// One Awful Answers room's authoritative state.
#[derive(Debug)]
pub struct AwfulAnswersGame {
    room_code: String,
    capacity: usize,
    win_score: u32,
    host: Option<PlayerId>,
    players: Vec<AwfulPlayer>,
    phase: AwfulPhase,
    prompts: Deck<PromptCard>,
    answers: Deck<AnswerCard>,
    total_prompts: usize,
    total_answers: usize,
    judge_idx: usize,
    prompt: Option<PromptCard>,
    /// Submission handles in the shuffled order the judge sees them, with
    /// the author each one stands for.
    reveal_order: Vec<(SubmissionId, PlayerId)>,
    last_round: Option<RoundResult>,
    events: VecDeque<Notice>,
    rng: StdRng,
}

impl AwfulAnswersGame {
    pub fn new(room_code: impl Into<String>, capacity: usize, pack: CardPack) -> Self {
        Self::with_rng(room_code.into(), capacity, pack, StdRng::from_os_rng())
    }

    /// Deterministic shuffles for tests and replays.
    pub fn with_seed(
        room_code: impl Into<String>,
        capacity: usize,
        pack: CardPack,
        seed: u64,
    ) -> Self {
        Self::with_rng(room_code.into(), capacity, pack, StdRng::seed_from_u64(seed))
    }

    fn with_rng(room_code: String, capacity: usize, pack: CardPack, mut rng: StdRng) -> Self {
        let total_prompts = pack.prompts.len();
        let total_answers = pack.answers.len();
        let mut prompts = Deck::new(pack.prompts);
        let mut answers = Deck::new(pack.answers);
        prompts.shuffle(&mut rng);
        answers.shuffle(&mut rng);
        Self {
            room_code,
            capacity,
            win_score: AWFUL_WIN_SCORE,
            host: None,
            players: Vec::with_capacity(capacity),
            phase: AwfulPhase::Lobby,
            prompts,
            answers,
            total_prompts,
            total_answers,
            judge_idx: 0,
            prompt: None,
            reveal_order: Vec::new(),
            last_round: None,
            events: VecDeque::new(),
            rng,
        }
    }

    /// Override the score that ends the game.
    pub fn with_win_score(mut self, win_score: u32) -> Self {
        self.win_score = win_score.max(1);
        self
    }

    // === Accessors ===

    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn phase(&self) -> AwfulPhase {
        self.phase
    }

    pub fn round_phase(&self) -> Option<RoundPhase> {
        match self.phase {
            AwfulPhase::Playing(round) => Some(round),
            _ => None,
        }
    }

    pub fn win_score(&self) -> u32 {
        self.win_score
    }

    pub fn judge(&self) -> Option<PlayerId> {
        match self.phase {
            AwfulPhase::Playing(_) => self.players.get(self.judge_idx).map(|p| p.seat.id),
            _ => None,
        }
    }

    pub fn prompt(&self) -> Option<&PromptCard> {
        self.prompt.as_ref()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.seat.id).collect()
    }

    pub fn player_name(&self, id: &PlayerId) -> Option<DisplayName> {
        self.position(id).map(|idx| self.players[idx].seat.name.clone())
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.position(id).is_some()
    }

    pub fn hand(&self, id: &PlayerId) -> Option<&[AnswerCard]> {
        self.position(id).map(|idx| self.players[idx].hand.as_slice())
    }

    pub fn submission(&self, id: &PlayerId) -> Option<&[AnswerCard]> {
        self.position(id)
            .and_then(|idx| self.players[idx].submission.as_deref())
    }

    pub fn score(&self, id: &PlayerId) -> Option<u32> {
        self.position(id).map(|idx| self.players[idx].seat.score)
    }

    pub fn last_round(&self) -> Option<&RoundResult> {
        self.last_round.as_ref()
    }

    /// Number of answers still expected this round.
    pub fn submissions_needed(&self) -> usize {
        match self.phase {
            AwfulPhase::Playing(_) => self.players.len().saturating_sub(1),
            _ => 0,
        }
    }

    pub fn submissions_received(&self) -> usize {
        self.players.iter().filter(|p| p.submission.is_some()).count()
    }

    /// The submissions in reveal order, as the judge sees them.
    pub fn revealed_answers(&self) -> Vec<RevealedAnswer> {
        self.reveal_order
            .iter()
            .filter_map(|(submission_id, author)| {
                let player = self.players.iter().find(|p| p.seat.id == *author)?;
                Some(RevealedAnswer {
                    submission_id: *submission_id,
                    cards: player.submission.clone()?,
                })
            })
            .collect()
    }

    pub fn drain_events(&mut self) -> VecDeque<Notice> {
        std::mem::take(&mut self.events)
    }

    fn position(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.seat.id == *id)
    }

    // === Membership ===

    /// Seat a player. Joining mid-game is allowed; the newcomer is dealt a
    /// full hand and answers from the next prompt they see.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: DisplayName,
        roles: Roles,
    ) -> Result<(), GameError> {
        if self.contains(&id) {
            return Err(GameError::AlreadyJoined);
        }
        if self.players.len() >= self.capacity {
            return Err(GameError::RoomFull);
        }

        self.players.push(AwfulPlayer {
            seat: Seat::new(id, name.clone(), roles),
            hand: Vec::new(),
            submission: None,
        });
        if matches!(self.phase, AwfulPhase::Playing(_)) {
            let idx = self.players.len() - 1;
            self.refill_hand(idx);
        }
        if self.host.is_none() {
            self.host = Some(id);
        }
        self.events.push_back(Notice::everyone(GameEvent::PlayerJoined {
            player_id: id,
            name,
        }));
        self.check_invariants();
        Ok(())
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Result<(), GameError> {
        let idx = self.position(id).ok_or(GameError::PlayerNotFound)?;
        let mut leaver = self.players.remove(idx);
        let submitted = leaver.submission.take().unwrap_or_default();
        for card in leaver.hand.drain(..).chain(submitted) {
            self.answers.discard(card);
        }
        self.reveal_order.retain(|(_, author)| author != id);

        self.events.push_back(Notice::everyone(GameEvent::PlayerLeft {
            player_id: leaver.seat.id,
            name: leaver.seat.name,
        }));
        if self.host == Some(*id) {
            self.host = self.players.first().map(|p| p.seat.id);
            if let Some(host) = self.host {
                self.events
                    .push_back(Notice::everyone(GameEvent::HostChanged { player_id: host }));
            }
        }

        if let AwfulPhase::Playing(round) = self.phase {
            if self.players.len() < AWFUL_MIN_TO_CONTINUE {
                self.return_to_lobby();
            } else {
                self.repair_round_after_removal(idx, round);
            }
        } else if self.players.is_empty() {
            self.judge_idx = 0;
        } else {
            self.judge_idx %= self.players.len();
        }
        self.check_invariants();
        Ok(())
    }

    fn repair_round_after_removal(&mut self, removed: usize, round: RoundPhase) {
        let n = self.players.len();
        let was_judge = removed == self.judge_idx;
        if removed < self.judge_idx {
            self.judge_idx -= 1;
        }

        match round {
            RoundPhase::Submitting | RoundPhase::Judging if was_judge => {
                // The round can't be judged; throw it away and hand the
                // prompt to whoever sat after the leaver.
                self.discard_round();
                self.judge_idx = removed % n;
                self.start_round();
            }
            RoundPhase::Submitting => {
                if self.all_submitted() {
                    self.reveal();
                }
            }
            RoundPhase::Judging => {
                if self.reveal_order.is_empty() {
                    self.discard_round();
                    self.start_round();
                } else if let Some(judge) = self.judge() {
                    let answers = self.revealed_answers();
                    self.events
                        .push_back(Notice::only(judge, GameEvent::AnswersRevealed { answers }));
                }
            }
            RoundPhase::RoundOver => {
                // `next_round` advances past this seat, so point at the one
                // before it.
                if was_judge {
                    self.judge_idx = (removed + n - 1) % n;
                }
            }
        }
    }

    // === Lifecycle ===

    /// Reset scores, deal ten answers each and open the first round with the
    /// first seat judging.
    pub fn start(&mut self) -> Result<(), GameError> {
        if matches!(self.phase, AwfulPhase::Playing(_)) {
            return Err(GameError::AlreadyStarted);
        }
        let have = self.players.len();
        if have < AWFUL_MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                needed: AWFUL_MIN_PLAYERS,
                have,
            });
        }

        self.collect_cards();
        self.prompts.shuffle(&mut self.rng);
        self.answers.shuffle(&mut self.rng);
        for idx in 0..self.players.len() {
            self.players[idx].seat.score = 0;
            self.refill_hand(idx);
        }
        self.judge_idx = 0;
        self.last_round = None;
        self.events.push_back(Notice::everyone(GameEvent::GameStarted {
            first_player: self.players[0].seat.id,
        }));
        self.start_round();
        log::debug!(
            "Awful Answers room {} started with {} players",
            self.room_code,
            have
        );
        self.check_invariants();
        Ok(())
    }

    fn start_round(&mut self) {
        for player in &mut self.players {
            if let Some(cards) = player.submission.take() {
                self.answers.gather(cards);
            }
        }
        self.reveal_order.clear();
        if let Some(prompt) = self.prompt.take() {
            self.prompts.discard(prompt);
        }
        let Ok(prompt) = self.prompts.draw_or_recycle(&mut self.rng) else {
            log::warn!("Awful Answers room {} ran out of prompts", self.room_code);
            self.return_to_lobby();
            return;
        };
        self.judge_idx %= self.players.len();
        let judge = self.players[self.judge_idx].seat.id;
        self.prompt = Some(prompt.clone());
        self.phase = AwfulPhase::Playing(RoundPhase::Submitting);
        self.events
            .push_back(Notice::everyone(GameEvent::RoundStarted { judge, prompt }));
    }

    /// Send the round's submissions and prompt to the discard piles.
    fn discard_round(&mut self) {
        for player in &mut self.players {
            if let Some(cards) = player.submission.take() {
                for card in cards {
                    self.answers.discard(card);
                }
            }
        }
        if let Some(prompt) = self.prompt.take() {
            self.prompts.discard(prompt);
        }
        self.reveal_order.clear();
    }

    fn collect_cards(&mut self) {
        for player in &mut self.players {
            self.answers.gather(player.hand.drain(..));
            if let Some(cards) = player.submission.take() {
                self.answers.gather(cards);
            }
        }
        if let Some(prompt) = self.prompt.take() {
            self.prompts.gather([prompt]);
        }
        self.answers.gather_discards();
        self.prompts.gather_discards();
        self.reveal_order.clear();
    }

    fn return_to_lobby(&mut self) {
        self.collect_cards();
        self.phase = AwfulPhase::Lobby;
        self.judge_idx = 0;
        self.events.push_back(Notice::everyone(GameEvent::ReturnedToLobby));
    }

    /// Top a hand back up to ten, recycling discards if needed. Stops early
    /// if every answer card is already held or in play.
    fn refill_hand(&mut self, idx: usize) {
        while self.players[idx].hand.len() < AWFUL_HAND_SIZE {
            match self.answers.draw_or_recycle(&mut self.rng) {
                Ok(card) => self.players[idx].hand.push(card),
                Err(_) => break,
            }
        }
    }

    fn all_submitted(&self) -> bool {
        self.players
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.judge_idx)
            .all(|(_, p)| p.submission.is_some())
    }

    fn reveal(&mut self) {
        let authors: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.submission.is_some())
            .map(|p| p.seat.id)
            .collect();
        let mut order: Vec<(SubmissionId, PlayerId)> = authors
            .into_iter()
            .map(|author| (SubmissionId(Uuid::from_u128(self.rng.random())), author))
            .collect();
        order.shuffle(&mut self.rng);
        self.reveal_order = order;
        self.phase = AwfulPhase::Playing(RoundPhase::Judging);

        let judge = self.players[self.judge_idx].seat.id;
        let answers = self.revealed_answers();
        self.events
            .push_back(Notice::only(judge, GameEvent::AnswersRevealed { answers }));
    }

    // === Round Actions ===

    /// Submit the hand cards at `card_indexes`, in the order given.
    pub fn submit_answer(
        &mut self,
        actor: &PlayerId,
        card_indexes: &[usize],
    ) -> Result<(), GameError> {
        match self.phase {
            AwfulPhase::Playing(RoundPhase::Submitting) => {}
            AwfulPhase::Lobby => return Err(GameError::NotStarted),
            _ => return Err(GameError::NotAcceptingAnswers),
        }
        let idx = self.position(actor).ok_or(GameError::NotInRoom)?;
        if idx == self.judge_idx {
            return Err(GameError::JudgeCannotSubmit);
        }
        if self.players[idx].submission.is_some() {
            return Err(GameError::AlreadySubmitted);
        }
        let expected = self.prompt.as_ref().map_or(1, |p| p.pick);
        let hand_len = self.players[idx].hand.len();
        let distinct: HashSet<usize> = card_indexes.iter().copied().collect();
        if card_indexes.len() != expected
            || distinct.len() != expected
            || card_indexes.iter().any(|i| *i >= hand_len)
        {
            return Err(GameError::InvalidSelection { expected });
        }

        let player = &mut self.players[idx];
        let cards: Vec<AnswerCard> = card_indexes
            .iter()
            .map(|i| player.hand[*i].clone())
            .collect();
        let mut removal = card_indexes.to_vec();
        removal.sort_unstable_by(|a, b| b.cmp(a));
        for i in removal {
            player.hand.remove(i);
        }
        player.submission = Some(cards);
        self.refill_hand(idx);

        self.events
            .push_back(Notice::everyone(GameEvent::AnswerSubmitted { player_id: *actor }));
        if self.all_submitted() {
            self.reveal();
        }
        self.check_invariants();
        Ok(())
    }

    /// The judge picks the winning submission by its handle. Returns the
    /// game winner if this point decided the game.
    pub fn select_winner(
        &mut self,
        actor: &PlayerId,
        submission: &SubmissionId,
    ) -> Result<Option<PlayerId>, GameError> {
        if self.phase != AwfulPhase::Playing(RoundPhase::Judging) {
            return Err(GameError::NotJudging);
        }
        if self.position(actor) != Some(self.judge_idx) {
            return Err(GameError::NotJudge);
        }
        let winner = self
            .reveal_order
            .iter()
            .find(|(id, _)| id == submission)
            .map(|(_, author)| *author)
            .ok_or(GameError::InvalidWinner)?;
        let winner_idx = self
            .position(&winner)
            .filter(|idx| self.players[*idx].submission.is_some())
            .ok_or(GameError::InvalidWinner)?;

        let seat = &mut self.players[winner_idx].seat;
        seat.score += 1;
        let (score, name) = (seat.score, seat.name.clone());
        let cards = self.players[winner_idx]
            .submission
            .clone()
            .unwrap_or_default();
        let prompt = self
            .prompt
            .clone()
            .unwrap_or_else(|| PromptCard::new("", 1));
        self.events.push_back(Notice::everyone(GameEvent::RoundWinner {
            player_id: winner,
            name: name.clone(),
            prompt: prompt.clone(),
            cards: cards.clone(),
        }));
        self.last_round = Some(RoundResult {
            winner,
            prompt,
            cards,
        });
        self.discard_round();

        if score >= self.win_score {
            self.phase = AwfulPhase::GameOver { winner };
            self.events
                .push_back(Notice::everyone(GameEvent::GameOver { winner, name }));
            log::info!("Awful Answers room {} won by {}", self.room_code, winner);
            self.check_invariants();
            return Ok(Some(winner));
        }
        self.phase = AwfulPhase::Playing(RoundPhase::RoundOver);
        self.check_invariants();
        Ok(None)
    }

    /// Pass the judge role to the next seat and draw a new prompt.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        match self.phase {
            AwfulPhase::Playing(RoundPhase::RoundOver) => {}
            AwfulPhase::Playing(_) => return Err(GameError::RoundInProgress),
            _ => return Err(GameError::NotStarted),
        }
        self.judge_idx = (self.judge_idx + 1) % self.players.len();
        self.start_round();
        self.check_invariants();
        Ok(())
    }

    // === Privileged Actions ===

    pub fn end_game(&mut self) -> Result<(), GameError> {
        if self.phase == AwfulPhase::Lobby {
            return Err(GameError::NotStarted);
        }
        self.return_to_lobby();
        Ok(())
    }

    /// Back to the lobby with every score cleared.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.seat.score = 0;
        }
        self.last_round = None;
        self.return_to_lobby();
    }

    /// Abandon the current round and move the judge role on.
    pub fn skip_turn(&mut self) -> Result<(), GameError> {
        let AwfulPhase::Playing(_) = self.phase else {
            return Err(GameError::NotStarted);
        };
        let skipped = self.players[self.judge_idx].seat.id;
        self.discard_round();
        self.judge_idx = (self.judge_idx + 1) % self.players.len();
        self.events
            .push_back(Notice::everyone(GameEvent::TurnPassed { player_id: skipped }));
        self.start_round();
        self.check_invariants();
        Ok(())
    }

    // === Views ===

    pub fn view_for(&self, id: &PlayerId) -> Option<GameView> {
        let me = self.position(id)?;
        let judge = self.judge();
        let is_judge = judge == Some(*id);
        let players = self
            .players
            .iter()
            .map(|p| AwfulPlayerView {
                id: p.seat.id,
                name: p.seat.name.clone(),
                card_count: p.hand.len(),
                score: p.seat.score,
                is_judge: judge == Some(p.seat.id),
                is_host: self.host == Some(p.seat.id),
                is_moderator: p.seat.roles.is_moderator,
                is_privileged: p.seat.roles.is_privileged,
                has_submitted: p.submission.is_some(),
            })
            .collect();
        let revealed = (is_judge && self.round_phase() == Some(RoundPhase::Judging))
            .then(|| self.revealed_answers());
        let winner = match self.phase {
            AwfulPhase::GameOver { winner } => Some(winner),
            _ => None,
        };

        Some(GameView::AwfulAnswers(AwfulView {
            room_code: self.room_code.clone(),
            capacity: self.capacity,
            started: matches!(self.phase, AwfulPhase::Playing(_)),
            round_phase: self.round_phase(),
            winner,
            win_score: self.win_score,
            players,
            prompt: self.prompt.clone(),
            hand: self.players[me].hand.clone(),
            is_judge,
            is_host: self.host == Some(*id),
            has_submitted: self.players[me].submission.is_some(),
            submissions_received: self.submissions_received(),
            submissions_needed: self.submissions_needed(),
            revealed,
            last_round: self.last_round.clone(),
        }))
    }

    fn check_invariants(&self) {
        let held: usize = self
            .players
            .iter()
            .map(|p| p.hand.len() + p.submission.as_ref().map_or(0, Vec::len))
            .sum();
        debug_assert_eq!(
            self.answers.len() + held,
            self.total_answers,
            "answer cards must be conserved"
        );
        debug_assert_eq!(
            self.prompts.len() + usize::from(self.prompt.is_some()),
            self.total_prompts,
            "prompt cards must be conserved"
        );
        if let AwfulPhase::Playing(_) = self.phase {
            debug_assert!(self.judge_idx < self.players.len());
        }
    }
}
