//! WildCard session: turn order, card legality, special effects and the
//! stacking draw penalty.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::cards::{Card, Color, Face, build_standard_deck};
use crate::game::{
    constants::{
        DRAW_FOUR_PENALTY, DRAW_TWO_PENALTY, SHORT_HAND_PENALTY, WILDCARD_DECK_SIZE,
        WILDCARD_HAND_SIZE, WILDCARD_MIN_PLAYERS,
    },
    deck::Deck,
    errors::GameError,
    events::{GameEvent, Notice, PenaltyReason},
    player::{DisplayName, PlayerId, Roles, Seat},
    views::{GameView, WildCardPlayerView, WildCardView},
};

/// Most cards a privileged user may force onto one player at once.
const MAX_FORCED_DRAW: usize = 20;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WildCardPhase {
    Lobby,
    InProgress,
    GameOver { winner: PlayerId },
}

/// An unresolved stack of draw cards and the face that may extend it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPenalty {
    pub count: usize,
    pub kind: Face,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayOutcome {
    /// A wild card was selected without a color; nothing moved.
    NeedColor,
    Played,
    Won,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawOutcome {
    /// The drawn card can be played; the turn stays with the drawer.
    Playable(Card),
    NotPlayable(Card),
    /// The drawer took a pending stacked penalty of this many cards.
    Penalty(usize),
}

#[derive(Debug)]
struct WildCardPlayer {
    seat: Seat,
    hand: Vec<Card>,
    called_warning: bool,
}

/// One WildCard room's authoritative state.
#[derive(Debug)]
pub struct WildCardGame {
    room_code: String,
    capacity: usize,
    host: Option<PlayerId>,
    players: Vec<WildCardPlayer>,
    phase: WildCardPhase,
    deck: Deck<Card>,
    turn_idx: usize,
    direction: Direction,
    /// Hand index of a wild card waiting on its player's color choice.
    pending_color: Option<usize>,
    penalty: Option<PendingPenalty>,
    /// Color forced onto the top discard by a privileged user. Cleared by the
    /// next discard.
    color_override: Option<Color>,
    drawn_this_turn: bool,
    events: VecDeque<Notice>,
    rng: StdRng,
}

impl WildCardGame {
    pub fn new(room_code: impl Into<String>, capacity: usize) -> Self {
        Self::with_rng(room_code.into(), capacity, StdRng::from_os_rng())
    }

    /// Deterministic shuffles for tests and replays.
    pub fn with_seed(room_code: impl Into<String>, capacity: usize, seed: u64) -> Self {
        Self::with_rng(room_code.into(), capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(room_code: String, capacity: usize, mut rng: StdRng) -> Self {
        let mut deck = Deck::new(build_standard_deck());
        deck.shuffle(&mut rng);
        Self {
            room_code,
            capacity,
            host: None,
            players: Vec::with_capacity(capacity),
            phase: WildCardPhase::Lobby,
            deck,
            turn_idx: 0,
            direction: Direction::default(),
            pending_color: None,
            penalty: None,
            color_override: None,
            drawn_this_turn: false,
            events: VecDeque::new(),
            rng,
        }
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

    pub fn phase(&self) -> WildCardPhase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn turn_index(&self) -> usize {
        self.turn_idx
    }

    pub fn pending_penalty(&self) -> Option<PendingPenalty> {
        self.penalty
    }

    pub fn pending_color(&self) -> Option<usize> {
        self.pending_color
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

    pub fn hand(&self, id: &PlayerId) -> Option<&[Card]> {
        self.position(id).map(|idx| self.players[idx].hand.as_slice())
    }

    pub fn score(&self, id: &PlayerId) -> Option<u32> {
        self.position(id).map(|idx| self.players[idx].seat.score)
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            WildCardPhase::InProgress => self.players.get(self.turn_idx).map(|p| p.seat.id),
            _ => None,
        }
    }

    /// The top discard with any forced color applied.
    pub fn top_card(&self) -> Option<Card> {
        self.deck.top_discard().map(|card| match self.color_override {
            Some(color) => Card { color, ..*card },
            None => *card,
        })
    }

    pub fn draw_pile_count(&self) -> usize {
        self.deck.draw_count()
    }

    pub fn discard_count(&self) -> usize {
        self.deck.discard_count()
    }

    /// Every card in the session, with declared wild colors cleared, sorted.
    pub fn card_census(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .deck
            .cards()
            .chain(self.players.iter().flat_map(|p| p.hand.iter()))
            .map(|card| card.unbound())
            .collect();
        cards.sort();
        cards
    }

    pub fn drain_events(&mut self) -> VecDeque<Notice> {
        std::mem::take(&mut self.events)
    }

    fn position(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.seat.id == *id)
    }

    fn ensure_current(&self, actor: &PlayerId) -> Result<usize, GameError> {
        if self.phase != WildCardPhase::InProgress {
            return Err(GameError::NotStarted);
        }
        let idx = self.position(actor).ok_or(GameError::NotInRoom)?;
        if idx != self.turn_idx {
            return Err(GameError::NotYourTurn);
        }
        Ok(idx)
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.phase {
            WildCardPhase::InProgress => Ok(()),
            _ => Err(GameError::NotStarted),
        }
    }

    // === Membership ===

    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: DisplayName,
        roles: Roles,
    ) -> Result<(), GameError> {
        if self.contains(&id) {
            return Err(GameError::AlreadyJoined);
        }
        if self.phase == WildCardPhase::InProgress {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() >= self.capacity {
            return Err(GameError::RoomFull);
        }

        self.players.push(WildCardPlayer {
            seat: Seat::new(id, name.clone(), roles),
            hand: Vec::new(),
            called_warning: false,
        });
        if self.host.is_none() {
            self.host = Some(id);
        }
        self.events.push_back(Notice::everyone(GameEvent::PlayerJoined {
            player_id: id,
            name,
        }));
        Ok(())
    }

    /// Remove a player at any point. Their hand goes beneath the top discard
    /// and the turn moves to whoever would have been next.
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<(), GameError> {
        let idx = self.position(id).ok_or(GameError::PlayerNotFound)?;
        let mut leaver = self.players.remove(idx);

        if self.phase == WildCardPhase::InProgress {
            self.deck.tuck_under_top(leaver.hand.drain(..));
            if self.players.len() < WILDCARD_MIN_PLAYERS {
                self.return_to_lobby();
            } else {
                self.repair_turn_after_removal(idx);
            }
        } else {
            self.deck.gather(leaver.hand.drain(..));
        }

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
        self.check_invariants();
        Ok(())
    }

    fn repair_turn_after_removal(&mut self, removed: usize) {
        let n = self.players.len();
        if removed < self.turn_idx {
            self.turn_idx -= 1;
        } else if removed == self.turn_idx {
            // The leaver's pending choices and obligations leave with them.
            self.pending_color = None;
            self.penalty = None;
            self.drawn_this_turn = false;
            self.turn_idx = match self.direction {
                Direction::Clockwise => removed % n,
                Direction::CounterClockwise => (removed + n - 1) % n,
            };
        }
        self.turn_idx %= n;
    }

    // === Lifecycle ===

    /// Gather every card, shuffle, deal seven each and turn over the opening
    /// discard.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase == WildCardPhase::InProgress {
            return Err(GameError::AlreadyStarted);
        }
        let have = self.players.len();
        if have < WILDCARD_MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                needed: WILDCARD_MIN_PLAYERS,
                have,
            });
        }

        self.collect_cards();
        self.deck.shuffle(&mut self.rng);
        for player in &mut self.players {
            player.called_warning = false;
            for _ in 0..WILDCARD_HAND_SIZE {
                player.hand.push(self.deck.draw()?);
            }
        }

        // Wild cards can't open; they go to the bottom and we draw again.
        let opening = loop {
            let card = self.deck.draw()?;
            if card.face.is_wild() {
                self.deck.put_on_bottom(card);
            } else {
                break card;
            }
        };
        self.deck.discard(opening);

        self.phase = WildCardPhase::InProgress;
        self.direction = Direction::Clockwise;
        self.penalty = None;
        self.pending_color = None;
        self.color_override = None;
        self.drawn_this_turn = false;
        self.turn_idx = 0;

        let started_at = self.events.len();
        if opening.is_special() {
            // The opening card acts as if the first seat had just played it.
            self.apply_special_effect(opening);
        }
        let first_player = self.players[self.turn_idx].seat.id;
        self.events.insert(
            started_at,
            Notice::everyone(GameEvent::GameStarted { first_player }),
        );
        log::debug!("WildCard room {} started with {} players", self.room_code, have);
        self.check_invariants();
        Ok(())
    }

    fn collect_cards(&mut self) {
        for player in &mut self.players {
            self.deck.gather(player.hand.drain(..));
        }
        self.deck.gather_discards();
        self.color_override = None;
    }

    fn return_to_lobby(&mut self) {
        self.collect_cards();
        self.phase = WildCardPhase::Lobby;
        self.penalty = None;
        self.pending_color = None;
        self.drawn_this_turn = false;
        self.direction = Direction::Clockwise;
        self.turn_idx = 0;
        self.events.push_back(Notice::everyone(GameEvent::ReturnedToLobby));
    }

    fn finish(&mut self, winner_idx: usize) {
        let seat = &mut self.players[winner_idx].seat;
        seat.score += 1;
        let (winner, name) = (seat.id, seat.name.clone());
        self.phase = WildCardPhase::GameOver { winner };
        self.penalty = None;
        self.pending_color = None;
        self.drawn_this_turn = false;
        self.events
            .push_back(Notice::everyone(GameEvent::GameOver { winner, name }));
        log::info!("WildCard room {} won by {}", self.room_code, winner);
    }

    // === Turn Actions ===

    pub fn advance_turn(&mut self) {
        let n = self.players.len();
        if n == 0 {
            return;
        }
        self.drawn_this_turn = false;
        self.turn_idx = match self.direction {
            Direction::Clockwise => (self.turn_idx + 1) % n,
            Direction::CounterClockwise => (self.turn_idx + n - 1) % n,
        };
    }

    /// Play the card at `card_index`. A wild card without a color only marks
    /// the choice as pending; the same card must be resubmitted with a color.
    pub fn play_card(
        &mut self,
        actor: &PlayerId,
        card_index: usize,
        chosen: Option<Color>,
    ) -> Result<PlayOutcome, GameError> {
        let idx = self.ensure_current(actor)?;
        let card = *self.players[idx]
            .hand
            .get(card_index)
            .ok_or(GameError::InvalidCardIndex(card_index))?;
        if let Some(pending) = self.pending_color
            && pending != card_index
        {
            return Err(GameError::ColorChoicePending);
        }
        let top = self.top_card().ok_or(GameError::NoCardsAvailable)?;
        let legal = match self.penalty {
            Some(penalty) => card.face == penalty.kind,
            None => card.can_play_on(&top),
        };
        if !legal {
            return Err(GameError::IllegalMove);
        }
        if card.face.is_wild() {
            match chosen {
                None => {
                    self.pending_color = Some(card_index);
                    self.events.push_back(Notice::only(
                        *actor,
                        GameEvent::NeedColorChoice { card_index },
                    ));
                    return Ok(PlayOutcome::NeedColor);
                }
                Some(Color::Wild) => return Err(GameError::InvalidColor),
                Some(_) => {}
            }
        }

        let mut card = self.players[idx].hand.remove(card_index);
        if card.face.is_wild()
            && let Some(color) = chosen
        {
            card.color = color;
        }
        self.deck.discard(card);
        self.color_override = None;
        self.pending_color = None;
        self.events.push_back(Notice::everyone(GameEvent::CardPlayed {
            player_id: *actor,
            card,
        }));

        if self.players[idx].hand.is_empty() {
            self.finish(idx);
            self.check_invariants();
            return Ok(PlayOutcome::Won);
        }

        self.penalize_short_hand(idx);
        if card.is_special() {
            self.apply_special_effect(card);
        } else {
            self.advance_turn();
        }
        self.check_invariants();
        Ok(PlayOutcome::Played)
    }

    /// Resolve the effect of a special card that was just discarded.
    pub fn apply_special_effect(&mut self, card: Card) {
        match card.face {
            Face::Skip => {
                self.advance_turn();
                self.advance_turn();
            }
            Face::Reverse => {
                self.direction = self.direction.reversed();
                // With two players a reverse hands the turn straight back.
                if self.players.len() == 2 {
                    self.advance_turn();
                }
                self.advance_turn();
            }
            Face::DrawTwo | Face::WildDrawFour => {
                let added = if card.face == Face::DrawTwo {
                    DRAW_TWO_PENALTY
                } else {
                    DRAW_FOUR_PENALTY
                };
                let count = self.penalty.map_or(0, |p| p.count) + added;
                self.penalty = Some(PendingPenalty {
                    count,
                    kind: card.face,
                });
                self.advance_turn();
                let can_stack = self.players[self.turn_idx]
                    .hand
                    .iter()
                    .any(|c| c.face == card.face);
                if !can_stack {
                    self.resolve_penalty();
                }
            }
            Face::Wild | Face::Number(_) => self.advance_turn(),
        }

        if self.deck.draw_count() == 0 {
            self.deck.reclaim_discard(&mut self.rng);
        }
    }

    /// The current player takes the whole pending stack and loses the turn.
    fn resolve_penalty(&mut self) -> usize {
        let Some(penalty) = self.penalty.take() else {
            return 0;
        };
        let idx = self.turn_idx;
        let drawn = self.deal_to(idx, penalty.count);
        self.events.push_back(Notice::everyone(GameEvent::PenaltyApplied {
            player_id: self.players[idx].seat.id,
            count: drawn,
            reason: PenaltyReason::Stacked,
        }));
        self.advance_turn();
        drawn
    }

    /// Deal up to `count` cards, reclaiming the discard pile as needed.
    /// Returns how many were actually dealt.
    fn deal_to(&mut self, idx: usize, count: usize) -> usize {
        let mut dealt = 0;
        for _ in 0..count {
            match self.deck.draw_or_reclaim(&mut self.rng) {
                Ok(card) => {
                    self.players[idx].hand.push(card);
                    dealt += 1;
                }
                Err(_) => break,
            }
        }
        if dealt > 0 {
            self.players[idx].called_warning = false;
        }
        dealt
    }

    pub fn draw_card(&mut self, actor: &PlayerId) -> Result<DrawOutcome, GameError> {
        let idx = self.ensure_current(actor)?;
        if self.pending_color.is_some() {
            return Err(GameError::ColorChoicePending);
        }
        if self.penalty.is_some() {
            let drawn = self.resolve_penalty();
            self.check_invariants();
            return Ok(DrawOutcome::Penalty(drawn));
        }
        if self.drawn_this_turn {
            return Err(GameError::AlreadyDrawnThisTurn);
        }

        let card = self.deck.draw_or_reclaim(&mut self.rng)?;
        let player = &mut self.players[idx];
        player.hand.push(card);
        player.called_warning = false;
        self.events.push_back(Notice::everyone(GameEvent::CardDrawn {
            player_id: *actor,
            count: 1,
        }));

        let playable = self.top_card().is_some_and(|top| card.can_play_on(&top));
        let outcome = if playable {
            self.drawn_this_turn = true;
            DrawOutcome::Playable(card)
        } else {
            self.advance_turn();
            DrawOutcome::NotPlayable(card)
        };
        self.check_invariants();
        Ok(outcome)
    }

    /// Give up the turn after drawing a playable card.
    pub fn pass_turn(&mut self, actor: &PlayerId) -> Result<(), GameError> {
        self.ensure_current(actor)?;
        if self.pending_color.is_some() {
            return Err(GameError::ColorChoicePending);
        }
        if self.penalty.is_some() {
            return Err(GameError::PenaltyPending);
        }
        if !self.drawn_this_turn {
            return Err(GameError::MustDrawFirst);
        }
        self.advance_turn();
        self.events
            .push_back(Notice::everyone(GameEvent::TurnPassed { player_id: *actor }));
        Ok(())
    }

    pub fn call_short_hand_warning(&mut self, actor: &PlayerId) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        let idx = self.position(actor).ok_or(GameError::NotInRoom)?;
        let player = &mut self.players[idx];
        if player.hand.len() != 2 {
            return Err(GameError::WarningNotAllowed);
        }
        player.called_warning = true;
        self.events.push_back(Notice::everyone(
            GameEvent::ShortHandWarningCalled { player_id: *actor },
        ));
        Ok(())
    }

    /// Apply the short-hand penalty to `id` if they hold one card without
    /// having called. Returns whether the penalty was applied.
    pub fn check_penalty(&mut self, id: &PlayerId) -> Result<bool, GameError> {
        self.ensure_in_progress()?;
        let idx = self.position(id).ok_or(GameError::PlayerNotFound)?;
        Ok(self.penalize_short_hand(idx))
    }

    fn penalize_short_hand(&mut self, idx: usize) -> bool {
        let player = &self.players[idx];
        if player.hand.len() != 1 || player.called_warning {
            return false;
        }
        let drawn = self.deal_to(idx, SHORT_HAND_PENALTY);
        self.events.push_back(Notice::everyone(GameEvent::PenaltyApplied {
            player_id: self.players[idx].seat.id,
            count: drawn,
            reason: PenaltyReason::ShortHand,
        }));
        true
    }

    // === Privileged Actions ===

    pub fn end_game(&mut self) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        self.return_to_lobby();
        Ok(())
    }

    /// Back to the lobby with every score cleared.
    pub fn reset(&mut self) {
        self.collect_cards();
        for player in &mut self.players {
            player.seat.score = 0;
            player.called_warning = false;
        }
        self.phase = WildCardPhase::Lobby;
        self.penalty = None;
        self.pending_color = None;
        self.drawn_this_turn = false;
        self.direction = Direction::Clockwise;
        self.turn_idx = 0;
        self.events.push_back(Notice::everyone(GameEvent::ReturnedToLobby));
    }

    pub fn change_top_color(&mut self, color: Color) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        if color == Color::Wild {
            return Err(GameError::InvalidColor);
        }
        self.color_override = Some(color);
        self.events
            .push_back(Notice::everyone(GameEvent::TopColorChanged { color }));
        Ok(())
    }

    pub fn force_draw(&mut self, target: &PlayerId, count: usize) -> Result<usize, GameError> {
        self.ensure_in_progress()?;
        if count == 0 || count > MAX_FORCED_DRAW {
            return Err(GameError::InvalidCount);
        }
        let idx = self.position(target).ok_or(GameError::PlayerNotFound)?;
        let drawn = self.deal_to(idx, count);
        self.events.push_back(Notice::everyone(GameEvent::PenaltyApplied {
            player_id: *target,
            count: drawn,
            reason: PenaltyReason::Forced,
        }));
        self.check_invariants();
        Ok(drawn)
    }

    /// Move the turn on, discarding the current player's pending choices.
    pub fn skip_turn(&mut self) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        let skipped = self.players[self.turn_idx].seat.id;
        self.pending_color = None;
        self.penalty = None;
        self.advance_turn();
        self.events
            .push_back(Notice::everyone(GameEvent::TurnPassed { player_id: skipped }));
        Ok(())
    }

    /// Put an in-progress game into a known position: every card is gathered,
    /// `top` is turned over, listed players receive exactly the listed cards,
    /// everyone else gets a fresh hand, and `turn` holds the turn.
    #[doc(hidden)]
    pub fn arrange(
        &mut self,
        top: Card,
        hands: &[(PlayerId, Vec<Card>)],
        turn: &PlayerId,
    ) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        let turn_idx = self.position(turn).ok_or(GameError::PlayerNotFound)?;
        self.collect_cards();
        self.deck.shuffle(&mut self.rng);

        let take = |deck: &mut Deck<Card>, want: Card| {
            deck.take_from_draw_pile(|c| *c == want.unbound())
                .ok_or(GameError::NoCardsAvailable)
        };
        let mut opening = take(&mut self.deck, top)?;
        opening.color = top.color;
        self.deck.discard(opening);

        for (id, cards) in hands {
            let idx = self.position(id).ok_or(GameError::PlayerNotFound)?;
            for want in cards {
                let card = take(&mut self.deck, *want)?;
                self.players[idx].hand.push(card);
            }
        }
        for idx in 0..self.players.len() {
            if self.players[idx].hand.is_empty() {
                for _ in 0..WILDCARD_HAND_SIZE {
                    let card = self.deck.draw()?;
                    self.players[idx].hand.push(card);
                }
            }
            self.players[idx].called_warning = false;
        }

        self.turn_idx = turn_idx;
        self.direction = Direction::Clockwise;
        self.penalty = None;
        self.pending_color = None;
        self.drawn_this_turn = false;
        self.check_invariants();
        Ok(())
    }

    // === Views ===

    pub fn view_for(&self, id: &PlayerId) -> Option<GameView> {
        let me = self.position(id)?;
        let current = self.current_player();
        let is_my_turn = current == Some(*id);
        let players = self
            .players
            .iter()
            .map(|p| WildCardPlayerView {
                id: p.seat.id,
                name: p.seat.name.clone(),
                card_count: p.hand.len(),
                score: p.seat.score,
                is_current_turn: current == Some(p.seat.id),
                is_host: self.host == Some(p.seat.id),
                is_moderator: p.seat.roles.is_moderator,
                is_privileged: p.seat.roles.is_privileged,
                called_short_hand_warning: p.called_warning,
            })
            .collect();
        let winner = match self.phase {
            WildCardPhase::GameOver { winner } => Some(winner),
            _ => None,
        };

        Some(GameView::WildCard(WildCardView {
            room_code: self.room_code.clone(),
            capacity: self.capacity,
            started: self.phase == WildCardPhase::InProgress,
            winner,
            players,
            top_card: self.top_card(),
            draw_pile_count: self.deck.draw_count(),
            direction: self.direction,
            pending_penalty: self.penalty,
            hand: self.players[me].hand.clone(),
            is_my_turn,
            is_host: self.host == Some(*id),
            awaiting_color: self.pending_color.filter(|_| is_my_turn),
            drawn_this_turn: is_my_turn && self.drawn_this_turn,
        }))
    }

    fn check_invariants(&self) {
        debug_assert_eq!(
            self.deck.len() + self.players.iter().map(|p| p.hand.len()).sum::<usize>(),
            WILDCARD_DECK_SIZE,
            "WildCard cards must be conserved"
        );
        if self.phase == WildCardPhase::InProgress {
            debug_assert!(
                self.turn_idx < self.players.len(),
                "turn index {} out of range for {} players",
                self.turn_idx,
                self.players.len()
            );
        }
    }
}
