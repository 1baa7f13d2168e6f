//! Awful Answers prompt and answer cards, and the content packs they come from.

use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};
use thiserror::Error;

use crate::game::{
    constants::{AWFUL_HAND_SIZE, AWFUL_MIN_PLAYERS},
    deck::Recyclable,
};

/// A prompt with the number of answers it needs.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PromptCard {
    pub text: String,
    pub pick: usize,
}

impl PromptCard {
    pub fn new(text: impl Into<String>, pick: usize) -> Self {
        Self {
            text: text.into(),
            pick,
        }
    }
}

impl Recyclable for PromptCard {}

impl fmt::Display for PromptCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pick > 1 {
            write!(f, "{} (pick {})", self.text, self.pick)
        } else {
            write!(f, "{}", self.text)
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AnswerCard(pub String);

impl Recyclable for AnswerCard {}

impl fmt::Display for AnswerCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AnswerCard {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CardPackError {
    #[error("failed to read card pack: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed card pack: {0}")]
    Json(#[from] serde_json::Error),
    #[error("card pack has no prompts")]
    NoPrompts,
    #[error("card pack needs at least {need} answers, has {have}")]
    NotEnoughAnswers { need: usize, have: usize },
    #[error("prompt \"{0}\" must pick at least one answer")]
    InvalidPick(String),
}

/// Content packs list prompts either as bare strings or as objects with a
/// pick count. Both normalize to [`PromptCard`] at load.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrompt {
    Text(String),
    Full {
        text: String,
        #[serde(default = "default_pick")]
        pick: usize,
    },
}

fn default_pick() -> usize {
    1
}

impl From<RawPrompt> for PromptCard {
    fn from(value: RawPrompt) -> Self {
        match value {
            RawPrompt::Text(text) => PromptCard::new(text, 1),
            RawPrompt::Full { text, pick } => PromptCard::new(text, pick),
        }
    }
}

#[derive(Deserialize)]
struct RawPack {
    #[serde(alias = "blackCards")]
    prompts: Vec<RawPrompt>,
    #[serde(alias = "whiteCards")]
    answers: Vec<String>,
}

/// Disjoint prompt and answer pools that seed each Awful Answers game.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CardPack {
    pub prompts: Vec<PromptCard>,
    pub answers: Vec<AnswerCard>,
}

impl CardPack {
    /// Parse a JSON pack of the form
    /// `{"prompts": ["...", {"text": "...", "pick": 2}], "answers": ["..."]}`.
    pub fn from_json(json: &str) -> Result<Self, CardPackError> {
        let raw: RawPack = serde_json::from_str(json)?;
        let pack = Self {
            prompts: raw.prompts.into_iter().map(PromptCard::from).collect(),
            answers: raw.answers.into_iter().map(AnswerCard).collect(),
        };
        pack.validate()?;
        Ok(pack)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CardPackError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), CardPackError> {
        if self.prompts.is_empty() {
            return Err(CardPackError::NoPrompts);
        }
        if let Some(prompt) = self.prompts.iter().find(|p| p.pick == 0) {
            return Err(CardPackError::InvalidPick(prompt.text.clone()));
        }
        let need = AWFUL_HAND_SIZE * AWFUL_MIN_PLAYERS;
        if self.answers.len() < need {
            return Err(CardPackError::NotEnoughAnswers {
                need,
                have: self.answers.len(),
            });
        }
        Ok(())
    }

    /// The pack compiled into the crate.
    pub fn builtin() -> Self {
        let prompts = BUILTIN_PROMPTS
            .iter()
            .map(|(text, pick)| PromptCard::new(*text, *pick))
            .collect();
        let answers = BUILTIN_ANSWERS.iter().map(|a| AnswerCard::from(*a)).collect();
        Self { prompts, answers }
    }
}

impl Default for CardPack {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_PROMPTS: &[(&str, usize)] = &[
    ("What's that smell?", 1),
    ("My secret talent is ____.", 1),
    ("The school cafeteria now serves ____.", 1),
    ("What ended my last vacation early?", 1),
    ("Grandma's new hobby: ____.", 1),
    ("What's the real reason the meeting ran late?", 1),
    ("I never leave the house without ____.", 1),
    ("The sequel nobody asked for: ____ 2.", 1),
    ("What did the office fridge smell like this week?", 1),
    ("Breaking news: scientists discover ____.", 1),
    ("My therapist says I need to stop ____.", 1),
    ("What's in the mystery box?", 1),
    ("The hardest part of adulthood is ____.", 1),
    ("My dog's secret double life involves ____.", 1),
    ("Step one of my five-year plan: ____.", 1),
    ("What's ruining the family reunion this year?", 1),
    ("The theme of this year's office party: ____.", 1),
    ("What am I getting everyone for the holidays?", 1),
    ("Instead of coal, naughty kids now get ____.", 1),
    ("What would grandpa find most upsetting?", 1),
    ("____ + ____ = a very long weekend.", 2),
    ("I traded ____ for ____ and regret nothing.", 2),
    ("My autobiography: ____, featuring ____.", 2),
    ("First came ____, then came ____.", 2),
    ("The new reality show pairs ____ with ____.", 2),
];

const BUILTIN_ANSWERS: &[&str] = &[
    "A suspiciously damp sock",
    "Interpretive dance",
    "Forty raccoons in a trench coat",
    "My browser history",
    "A participation trophy",
    "Unskippable ads",
    "Aggressive napping",
    "The group chat",
    "A haunted toaster",
    "Tax season",
    "Decaf coffee",
    "Reply-all emails",
    "A goose with a grudge",
    "Glitter. Everywhere.",
    "The Wi-Fi password",
    "My ex's playlist",
    "A microwave fish lunch",
    "Crying in the car",
    "Pineapple on pizza",
    "An uncomfortable silence",
    "Socks with sandals",
    "A mime having a breakdown",
    "Stepping on a LEGO",
    "Dad jokes",
    "The last slice of cake",
    "A clown college dropout",
    "Accidentally liking an old photo",
    "Hold music",
    "A bouncy castle",
    "Unsolicited advice",
    "Competitive cheese rolling",
    "The Monday blues",
    "A motivational poster",
    "Elbow grease",
    "My landlord",
    "Expired yogurt",
    "A karaoke ballad",
    "Spontaneous jazz hands",
    "The sound of dial-up internet",
    "A sentient vending machine",
    "Forgetting someone's name mid-sentence",
    "Mandatory fun",
    "A very confident pigeon",
    "Too many browser tabs",
    "A stale fortune cookie",
    "Pretending to understand wine",
    "The neighbor's leaf blower",
    "A fax machine",
    "Emotional support houseplants",
    "A tiny hat",
    "Low battery anxiety",
    "Overdue library books",
    "A conspiracy board with red string",
    "Cargo shorts",
    "A surprise pop quiz",
    "Lukewarm soup",
    "Getting lost in IKEA",
    "An award-winning chili recipe",
    "Hiding from the mail carrier",
    "A reusable grocery bag collection",
    "The self-checkout machine",
    "Sleeping through three alarms",
    "A disappointing magician",
    "Mime school",
    "A llama in a sweater",
    "Accidental eye contact",
    "A gym membership I never use",
    "A dramatic exit",
    "The final boss",
    "Spam calls about my car's warranty",
    "Mystery meat",
    "A snow day",
    "Interrupting cows",
    "An inflatable dinosaur costume",
    "Finger guns",
    "Chronic oversharing",
    "A perfectly good cardboard box",
    "My spirit animal",
    "A banana peel",
    "The five-second rule",
    "Socks that don't match",
    "The spicy sauce",
    "A grumpy cat",
    "A robot uprising",
    "A Renaissance fair",
    "Jumping to conclusions",
    "A questionable tattoo",
    "The world's largest rubber band ball",
    "A really long receipt",
    "Passive-aggressive sticky notes",
    "Flip phones",
    "A midlife crisis sports car",
    "Bad puns",
    "The sock monster",
    "A kazoo solo",
    "A potluck casserole",
    "An escape room",
    "Running out of toilet paper",
    "A fog machine",
    "Cold pizza for breakfast",
    "A very long PowerPoint",
    "A pirate accent",
    "The silent treatment",
    "A friendship bracelet",
    "Talking to plants",
    "An existential crisis",
    "A tuba",
    "Extreme couponing",
    "A squirrel with ambition",
    "Free samples",
    "The snooze button",
    "Awkward small talk",
    "A bag of loose change",
    "A time machine",
    "Wearing pajamas to work",
    "The family group photo",
    "An unsupervised toddler",
    "A giant foam finger",
    "Tiny sandwiches",
    "A second breakfast",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_pack_is_valid() {
        let pack = CardPack::builtin();
        assert!(pack.validate().is_ok());
        assert!(pack.prompts.iter().any(|p| p.pick == 2));
    }

    #[test]
    fn test_from_json_normalizes_prompts() {
        let answers: Vec<String> = (0..AWFUL_HAND_SIZE * AWFUL_MIN_PLAYERS)
            .map(|i| format!("answer {i}"))
            .collect();
        let json = serde_json::json!({
            "prompts": ["Bare prompt", {"text": "Two blanks", "pick": 2}, {"text": "Default pick"}],
            "answers": answers,
        })
        .to_string();

        let pack = CardPack::from_json(&json).unwrap();
        assert_eq!(pack.prompts[0], PromptCard::new("Bare prompt", 1));
        assert_eq!(pack.prompts[1], PromptCard::new("Two blanks", 2));
        assert_eq!(pack.prompts[2].pick, 1);
        assert_eq!(pack.answers.len(), 40);
    }

    #[test]
    fn test_from_json_accepts_legacy_field_names() {
        let answers: Vec<String> = (0..40).map(|i| format!("a{i}")).collect();
        let json = serde_json::json!({ "blackCards": ["Why?"], "whiteCards": answers }).to_string();
        assert!(CardPack::from_json(&json).is_ok());
    }

    #[test]
    fn test_from_json_rejects_small_pack() {
        let json = r#"{"prompts": ["Why?"], "answers": ["Because"]}"#;
        assert!(matches!(
            CardPack::from_json(json),
            Err(CardPackError::NotEnoughAnswers { have: 1, .. })
        ));
    }

    #[test]
    fn test_from_json_rejects_zero_pick() {
        let answers: Vec<String> = (0..40).map(|i| format!("a{i}")).collect();
        let json =
            serde_json::json!({ "prompts": [{"text": "Huh", "pick": 0}], "answers": answers })
                .to_string();
        assert!(matches!(
            CardPack::from_json(&json),
            Err(CardPackError::InvalidPick(_))
        ));
    }
}
