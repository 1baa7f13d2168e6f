//! The game-agnostic face of a room's session.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};

use super::{
    awful::{AwfulAnswersGame, AwfulPhase, CardPack},
    errors::GameError,
    events::{Notice, SubmissionId},
    player::{DisplayName, PlayerId, Roles},
    views::GameView,
    wildcard::{Color, PlayOutcome, WildCardGame, WildCardPhase},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GameKind {
    WildCard,
    AwfulAnswers,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WildCard => "wildcard",
            Self::AwfulAnswers => "awful-answers",
        };
        write!(f, "{repr}")
    }
}

/// In-room actions. Membership changes (join, leave, kick) go through the
/// session's add and remove methods instead.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoomAction {
    Start,
    /// Start regardless of who asks.
    ForceStart,
    Play {
        card_index: usize,
        color: Option<Color>,
    },
    Draw,
    Pass,
    CallWarning,
    Submit {
        card_indexes: Vec<usize>,
    },
    SelectWinner {
        submission: SubmissionId,
    },
    NextRound,
    EndGame,
    Reset,
    ChangeTopColor {
        color: Color,
    },
    ForceDraw {
        target: PlayerId,
        count: usize,
    },
    SkipTurn,
}

/// What an accepted action led to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    Applied,
    /// A wild card is waiting on its color.
    NeedColor,
    GameOver {
        game: GameKind,
        winner: PlayerId,
        name: DisplayName,
    },
}

/// Operations every game session supports.
#[enum_dispatch]
pub trait SessionRules {
    fn kind(&self) -> GameKind;
    fn room_code(&self) -> &str;
    fn capacity(&self) -> usize;
    fn host(&self) -> Option<PlayerId>;
    fn player_count(&self) -> usize;
    fn contains(&self, id: &PlayerId) -> bool;
    fn player_name(&self, id: &PlayerId) -> Option<DisplayName>;
    fn player_ids(&self) -> Vec<PlayerId>;
    fn is_started(&self) -> bool;
    fn allows_late_join(&self) -> bool;
    fn add_player(
        &mut self,
        id: PlayerId,
        name: DisplayName,
        roles: Roles,
    ) -> Result<(), GameError>;
    fn remove_player(&mut self, id: &PlayerId) -> Result<(), GameError>;

    /// Validate and apply `action` on behalf of `actor`. On error nothing
    /// changed and no events were queued.
    fn apply(&mut self, actor: &PlayerId, action: RoomAction) -> Result<ActionOutcome, GameError>;

    /// Project the session for one member.
    ///
    /// # Important
    /// The projection never includes another member's hand.
    #[must_use]
    fn view_for(&self, id: &PlayerId) -> Option<GameView>;

    fn drain_events(&mut self) -> VecDeque<Notice>;
}

/// A room's session, dispatching to the game it hosts.
#[enum_dispatch(SessionRules)]
#[derive(Debug)]
pub enum GameSession {
    WildCard(WildCardGame),
    AwfulAnswers(AwfulAnswersGame),
}

impl GameSession {
    /// Open a session in its lobby. `pack` and `win_score` only matter to
    /// Awful Answers.
    pub fn new(
        kind: GameKind,
        room_code: &str,
        capacity: usize,
        pack: &CardPack,
        win_score: u32,
    ) -> Self {
        match kind {
            GameKind::WildCard => WildCardGame::new(room_code, capacity).into(),
            GameKind::AwfulAnswers => AwfulAnswersGame::new(room_code, capacity, pack.clone())
                .with_win_score(win_score)
                .into(),
        }
    }
}

fn ensure_host(host: Option<PlayerId>, actor: &PlayerId) -> Result<(), GameError> {
    if host == Some(*actor) {
        Ok(())
    } else {
        Err(GameError::NotHost)
    }
}

impl SessionRules for WildCardGame {
    fn kind(&self) -> GameKind {
        GameKind::WildCard
    }

    fn room_code(&self) -> &str {
        WildCardGame::room_code(self)
    }

    fn capacity(&self) -> usize {
        WildCardGame::capacity(self)
    }

    fn host(&self) -> Option<PlayerId> {
        WildCardGame::host(self)
    }

    fn player_count(&self) -> usize {
        WildCardGame::player_count(self)
    }

    fn contains(&self, id: &PlayerId) -> bool {
        WildCardGame::contains(self, id)
    }

    fn player_name(&self, id: &PlayerId) -> Option<DisplayName> {
        WildCardGame::player_name(self, id)
    }

    fn player_ids(&self) -> Vec<PlayerId> {
        WildCardGame::player_ids(self)
    }

    fn is_started(&self) -> bool {
        self.phase() == WildCardPhase::InProgress
    }

    fn allows_late_join(&self) -> bool {
        false
    }

    fn add_player(
        &mut self,
        id: PlayerId,
        name: DisplayName,
        roles: Roles,
    ) -> Result<(), GameError> {
        WildCardGame::add_player(self, id, name, roles)
    }

    fn remove_player(&mut self, id: &PlayerId) -> Result<(), GameError> {
        WildCardGame::remove_player(self, id)
    }

    fn apply(&mut self, actor: &PlayerId, action: RoomAction) -> Result<ActionOutcome, GameError> {
        if !WildCardGame::contains(self, actor) {
            return Err(GameError::NotInRoom);
        }
        match action {
            RoomAction::Start => {
                ensure_host(WildCardGame::host(self), actor)?;
                self.start()?;
            }
            RoomAction::ForceStart => self.start()?,
            RoomAction::Play { card_index, color } => {
                match self.play_card(actor, card_index, color)? {
                    PlayOutcome::NeedColor => return Ok(ActionOutcome::NeedColor),
                    PlayOutcome::Won => {
                        let name = WildCardGame::player_name(self, actor).unwrap_or_default();
                        return Ok(ActionOutcome::GameOver {
                            game: GameKind::WildCard,
                            winner: *actor,
                            name,
                        });
                    }
                    PlayOutcome::Played => {}
                }
            }
            RoomAction::Draw => {
                self.draw_card(actor)?;
            }
            RoomAction::Pass => self.pass_turn(actor)?,
            RoomAction::CallWarning => self.call_short_hand_warning(actor)?,
            RoomAction::EndGame => self.end_game()?,
            RoomAction::Reset => self.reset(),
            RoomAction::ChangeTopColor { color } => self.change_top_color(color)?,
            RoomAction::ForceDraw { target, count } => {
                self.force_draw(&target, count)?;
            }
            RoomAction::SkipTurn => self.skip_turn()?,
            RoomAction::Submit { .. } | RoomAction::SelectWinner { .. } | RoomAction::NextRound => {
                return Err(GameError::UnsupportedAction);
            }
        }
        Ok(ActionOutcome::Applied)
    }

    fn view_for(&self, id: &PlayerId) -> Option<GameView> {
        WildCardGame::view_for(self, id)
    }

    fn drain_events(&mut self) -> VecDeque<Notice> {
        WildCardGame::drain_events(self)
    }
}

impl SessionRules for AwfulAnswersGame {
    fn kind(&self) -> GameKind {
        GameKind::AwfulAnswers
    }

    fn room_code(&self) -> &str {
        AwfulAnswersGame::room_code(self)
    }

    fn capacity(&self) -> usize {
        AwfulAnswersGame::capacity(self)
    }

    fn host(&self) -> Option<PlayerId> {
        AwfulAnswersGame::host(self)
    }

    fn player_count(&self) -> usize {
        AwfulAnswersGame::player_count(self)
    }

    fn contains(&self, id: &PlayerId) -> bool {
        AwfulAnswersGame::contains(self, id)
    }

    fn player_name(&self, id: &PlayerId) -> Option<DisplayName> {
        AwfulAnswersGame::player_name(self, id)
    }

    fn player_ids(&self) -> Vec<PlayerId> {
        AwfulAnswersGame::player_ids(self)
    }

    fn is_started(&self) -> bool {
        matches!(self.phase(), AwfulPhase::Playing(_))
    }

    fn allows_late_join(&self) -> bool {
        true
    }

    fn add_player(
        &mut self,
        id: PlayerId,
        name: DisplayName,
        roles: Roles,
    ) -> Result<(), GameError> {
        AwfulAnswersGame::add_player(self, id, name, roles)
    }

    fn remove_player(&mut self, id: &PlayerId) -> Result<(), GameError> {
        AwfulAnswersGame::remove_player(self, id)
    }

    fn apply(&mut self, actor: &PlayerId, action: RoomAction) -> Result<ActionOutcome, GameError> {
        if !AwfulAnswersGame::contains(self, actor) {
            return Err(GameError::NotInRoom);
        }
        match action {
            RoomAction::Start => {
                ensure_host(AwfulAnswersGame::host(self), actor)?;
                self.start()?;
            }
            RoomAction::ForceStart => self.start()?,
            RoomAction::Submit { card_indexes } => self.submit_answer(actor, &card_indexes)?,
            RoomAction::SelectWinner { submission } => {
                if let Some(winner) = self.select_winner(actor, &submission)? {
                    let name = AwfulAnswersGame::player_name(self, &winner).unwrap_or_default();
                    return Ok(ActionOutcome::GameOver {
                        game: GameKind::AwfulAnswers,
                        winner,
                        name,
                    });
                }
            }
            RoomAction::NextRound => self.next_round()?,
            RoomAction::EndGame => self.end_game()?,
            RoomAction::Reset => self.reset(),
            RoomAction::SkipTurn => self.skip_turn()?,
            RoomAction::Play { .. }
            | RoomAction::Draw
            | RoomAction::Pass
            | RoomAction::CallWarning
            | RoomAction::ChangeTopColor { .. }
            | RoomAction::ForceDraw { .. } => return Err(GameError::UnsupportedAction),
        }
        Ok(ActionOutcome::Applied)
    }

    fn view_for(&self, id: &PlayerId) -> Option<GameView> {
        AwfulAnswersGame::view_for(self, id)
    }

    fn drain_events(&mut self) -> VecDeque<Notice> {
        AwfulAnswersGame::drain_events(self)
    }
}
