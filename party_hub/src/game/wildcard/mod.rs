//! WildCard: shed your hand by matching the top discard on color or face.

mod cards;
mod state_machine;

pub use cards::{Card, Color, Face, build_standard_deck};
pub use state_machine::{
    Direction, DrawOutcome, PendingPenalty, PlayOutcome, WildCardGame, WildCardPhase,
};
