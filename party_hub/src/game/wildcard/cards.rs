//! WildCard card model and the standard 108-card deck.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::deck::Recyclable;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    // Printed color of the wild cards. A played wild card takes on the color
    // its player chose.
    Wild,
}

impl Color {
    pub const PLAYABLE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Wild => "wild",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Face {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl Face {
    pub fn is_wild(&self) -> bool {
        matches!(self, Self::Wild | Self::WildDrawFour)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Skip => write!(f, "Skip"),
            Self::Reverse => write!(f, "Reverse"),
            Self::DrawTwo => write!(f, "Draw Two"),
            Self::Wild => write!(f, "Wild"),
            Self::WildDrawFour => write!(f, "Wild Draw Four"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub color: Color,
    pub face: Face,
}

impl Card {
    pub const fn new(color: Color, face: Face) -> Self {
        Self { color, face }
    }

    pub const fn wild(face: Face) -> Self {
        Self {
            color: Color::Wild,
            face,
        }
    }

    /// Whether this card may be played on `top`.
    ///
    /// Wild is symmetric: a wild candidate plays on anything, and anything
    /// plays on a top card whose color is still wild.
    pub fn can_play_on(&self, top: &Card) -> bool {
        self.color == top.color
            || self.face == top.face
            || self.color == Color::Wild
            || top.color == Color::Wild
    }

    pub fn is_special(&self) -> bool {
        !matches!(self.face, Face::Number(_))
    }

    /// The card as printed, with any declared wild color cleared.
    pub fn unbound(mut self) -> Self {
        self.reset();
        self
    }
}

impl Recyclable for Card {
    fn reset(&mut self) {
        if self.face.is_wild() {
            self.color = Color::Wild;
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.face.is_wild() && self.color == Color::Wild {
            write!(f, "{}", self.face)
        } else {
            write!(f, "{} {}", self.color, self.face)
        }
    }
}

/// Build the 108-card deck: per color one 0 and two each of 1-9, Skip,
/// Reverse and Draw Two, plus four Wild and four Wild Draw Four.
pub fn build_standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(108);
    for color in Color::PLAYABLE {
        cards.push(Card::new(color, Face::Number(0)));
        let faces = (1..=9)
            .map(Face::Number)
            .chain([Face::Skip, Face::Reverse, Face::DrawTwo]);
        for face in faces {
            cards.push(Card::new(color, face));
            cards.push(Card::new(color, face));
        }
    }
    for _ in 0..4 {
        cards.push(Card::wild(Face::Wild));
        cards.push(Card::wild(Face::WildDrawFour));
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::WILDCARD_DECK_SIZE;

    // === Legality Tests ===

    #[test]
    fn test_can_play_on_same_color() {
        let top = Card::new(Color::Red, Face::Number(5));
        assert!(Card::new(Color::Red, Face::Skip).can_play_on(&top));
    }

    #[test]
    fn test_can_play_on_same_face() {
        let top = Card::new(Color::Red, Face::Number(5));
        assert!(Card::new(Color::Blue, Face::Number(5)).can_play_on(&top));
    }

    #[test]
    fn test_cannot_play_mismatched() {
        let top = Card::new(Color::Red, Face::Number(5));
        assert!(!Card::new(Color::Blue, Face::Number(7)).can_play_on(&top));
    }

    #[test]
    fn test_wild_plays_on_anything() {
        let top = Card::new(Color::Red, Face::Number(5));
        assert!(Card::wild(Face::Wild).can_play_on(&top));
        assert!(Card::wild(Face::WildDrawFour).can_play_on(&top));
    }

    #[test]
    fn test_anything_plays_on_unbound_wild() {
        let top = Card::wild(Face::Wild);
        assert!(Card::new(Color::Green, Face::Number(2)).can_play_on(&top));
    }

    #[test]
    fn test_bound_wild_requires_declared_color() {
        let top = Card::new(Color::Blue, Face::Wild);
        assert!(Card::new(Color::Blue, Face::Number(3)).can_play_on(&top));
        assert!(!Card::new(Color::Red, Face::Number(3)).can_play_on(&top));
    }

    #[test]
    fn test_is_special() {
        assert!(!Card::new(Color::Red, Face::Number(0)).is_special());
        for face in [Face::Skip, Face::Reverse, Face::DrawTwo] {
            assert!(Card::new(Color::Red, face).is_special());
        }
        assert!(Card::wild(Face::Wild).is_special());
        assert!(Card::wild(Face::WildDrawFour).is_special());
    }

    // === Deck Composition Tests ===

    #[test]
    fn test_standard_deck_size() {
        assert_eq!(build_standard_deck().len(), WILDCARD_DECK_SIZE);
    }

    #[test]
    fn test_standard_deck_composition() {
        let deck = build_standard_deck();
        let count = |card: Card| deck.iter().filter(|c| **c == card).count();

        for color in Color::PLAYABLE {
            assert_eq!(count(Card::new(color, Face::Number(0))), 1);
            assert_eq!(count(Card::new(color, Face::Number(9))), 2);
            assert_eq!(count(Card::new(color, Face::DrawTwo)), 2);
        }
        assert_eq!(count(Card::wild(Face::Wild)), 4);
        assert_eq!(count(Card::wild(Face::WildDrawFour)), 4);
    }

    #[test]
    fn test_reset_clears_declared_color() {
        let played = Card::new(Color::Green, Face::WildDrawFour);
        assert_eq!(played.unbound(), Card::wild(Face::WildDrawFour));

        let plain = Card::new(Color::Green, Face::Number(4));
        assert_eq!(plain.unbound(), plain);
    }
}
