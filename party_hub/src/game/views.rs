//! Per-recipient projections of a session.
//!
//! A view never carries another player's hand. Opponents are reduced to a
//! name, a card count and role flags.

use serde::{Deserialize, Serialize};

use super::{
    awful::{AnswerCard, PromptCard, RoundPhase},
    events::RevealedAnswer,
    player::{DisplayName, PlayerId},
    wildcard::{Card, Direction, PendingPenalty},
};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WildCardPlayerView {
    pub id: PlayerId,
    pub name: DisplayName,
    pub card_count: usize,
    pub score: u32,
    pub is_current_turn: bool,
    pub is_host: bool,
    pub is_moderator: bool,
    pub is_privileged: bool,
    pub called_short_hand_warning: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WildCardView {
    pub room_code: String,
    pub capacity: usize,
    pub started: bool,
    pub winner: Option<PlayerId>,
    pub players: Vec<WildCardPlayerView>,
    pub top_card: Option<Card>,
    pub draw_pile_count: usize,
    pub direction: Direction,
    pub pending_penalty: Option<PendingPenalty>,
    pub hand: Vec<Card>,
    pub is_my_turn: bool,
    pub is_host: bool,
    /// Index of the wild card waiting for this player's color choice.
    pub awaiting_color: Option<usize>,
    pub drawn_this_turn: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwfulPlayerView {
    pub id: PlayerId,
    pub name: DisplayName,
    pub card_count: usize,
    pub score: u32,
    pub is_judge: bool,
    pub is_host: bool,
    pub is_moderator: bool,
    pub is_privileged: bool,
    pub has_submitted: bool,
}

/// The previous round's result, kept for display after its cards are
/// discarded.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub winner: PlayerId,
    pub prompt: PromptCard,
    pub cards: Vec<AnswerCard>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwfulView {
    pub room_code: String,
    pub capacity: usize,
    pub started: bool,
    pub round_phase: Option<RoundPhase>,
    pub winner: Option<PlayerId>,
    pub win_score: u32,
    pub players: Vec<AwfulPlayerView>,
    pub prompt: Option<PromptCard>,
    pub hand: Vec<AnswerCard>,
    pub is_judge: bool,
    pub is_host: bool,
    pub has_submitted: bool,
    pub submissions_received: usize,
    pub submissions_needed: usize,
    /// Only populated for the judge while judging.
    pub revealed: Option<Vec<RevealedAnswer>>,
    pub last_round: Option<RoundResult>,
}

/// The game state as viewed from one member's perspective.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "camelCase")]
pub enum GameView {
    WildCard(WildCardView),
    AwfulAnswers(AwfulView),
}

impl GameView {
    pub fn room_code(&self) -> &str {
        match self {
            Self::WildCard(view) => &view.room_code,
            Self::AwfulAnswers(view) => &view.room_code,
        }
    }
}
