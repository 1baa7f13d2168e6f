//! Awful Answers: fill in the blank, and let the judge decide who was worst.

mod cards;
mod state_machine;

pub use cards::{AnswerCard, CardPack, CardPackError, PromptCard};
pub use state_machine::{AwfulAnswersGame, AwfulPhase, RoundPhase};
