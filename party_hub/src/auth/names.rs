//! Display name screening and guest name generation.

use async_trait::async_trait;
use rand::seq::IndexedRandom;

/// Terms that suggest a player speaks for the site.
const IMPERSONATION_TERMS: &[&str] = &[
    "moderator",
    "admin",
    "administrator",
    "staff",
    "owner",
    "official",
    "support",
    "system",
    "server",
];

const COLORS: &[&str] = &[
    "Red", "Blue", "Green", "Yellow", "Purple", "Orange", "Pink", "Cyan", "Magenta", "Violet",
    "Indigo", "Teal", "Lime", "Aqua", "Crimson", "Gold", "Silver", "Bronze", "Coral", "Amber",
    "Jade", "Ruby", "Sapphire", "Emerald",
];

const ANIMALS: &[&str] = &[
    "Wolf", "Tiger", "Lion", "Bear", "Eagle", "Hawk", "Dragon", "Phoenix", "Panda", "Koala",
    "Otter", "Fox", "Raccoon", "Badger", "Wombat", "Penguin", "Dolphin", "Whale", "Shark",
    "Octopus", "Leopard", "Panther", "Cheetah", "Jaguar", "Falcon", "Raven", "Owl", "Parrot",
    "Toucan", "Pelican", "Turtle", "Gecko", "Lemur", "Sloth", "Armadillo",
];

const OBJECTS: &[&str] = &[
    "Sword", "Shield", "Axe", "Hammer", "Spear", "Bow", "Arrow", "Dagger", "Crown", "Throne",
    "Castle", "Tower", "Bridge", "Gate", "Book", "Scroll", "Quill", "Map", "Compass", "Telescope",
    "Coin", "Gem", "Diamond", "Pearl", "Crystal", "Orb", "Wand", "Key", "Lock", "Star",
    "Moon", "Sun", "Cloud", "Storm", "Ember", "Mountain", "River", "Lake", "Ocean",
];

/// Screens display names before they reach a room.
#[async_trait]
pub trait NameFilter: Send + Sync {
    async fn is_name_disallowed(&self, name: &str) -> bool;
}

/// Substring blacklist, also matched after undoing common digit-for-letter
/// substitutions
#[derive(Debug, Clone)]
pub struct BlacklistFilter {
    terms: Vec<String>,
}

impl BlacklistFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|term| term.as_ref().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    /// Check a name synchronously
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        let normalized = normalize_substitutions(&lower);
        self.terms
            .iter()
            .any(|term| lower.contains(term.as_str()) || normalized.contains(term.as_str()))
    }
}

impl Default for BlacklistFilter {
    fn default() -> Self {
        Self::new(IMPERSONATION_TERMS)
    }
}

#[async_trait]
impl NameFilter for BlacklistFilter {
    async fn is_name_disallowed(&self, name: &str) -> bool {
        self.matches(name)
    }
}

fn normalize_substitutions(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            '0' => Some('o'),
            '1' | '!' => Some('i'),
            '3' => Some('e'),
            '4' | '@' => Some('a'),
            '5' | '$' => Some('s'),
            '7' => Some('t'),
            '8' => Some('b'),
            '*' | '_' | '-' | ' ' | '.' => None,
            other => Some(other),
        })
        .collect()
}

/// Random `Color-Animal-Object` name for players who don't pick one.
pub fn generate_guest_name() -> String {
    let mut rng = rand::rng();
    let color = COLORS.choose(&mut rng).copied().unwrap_or("Grey");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("Cat");
    let object = OBJECTS.choose(&mut rng).copied().unwrap_or("Hat");
    format!("{color}-{animal}-{object}")
}
