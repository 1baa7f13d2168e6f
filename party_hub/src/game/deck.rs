//! Draw and discard piles shared by both games.

use rand::{Rng, seq::SliceRandom};

use super::errors::GameError;

/// Cards that carry per-play state (like a wild card's declared color)
/// which has to be cleared before the card re-enters the draw pile.
pub trait Recyclable {
    fn reset(&mut self) {}
}

/// A draw pile and a discard pile. The top of each pile is the end of its
/// vector.
#[derive(Clone, Debug)]
pub struct Deck<C> {
    draw_pile: Vec<C>,
    discard_pile: Vec<C>,
}

impl<C: Recyclable> Deck<C> {
    /// Create a deck whose draw pile holds `cards` in the given order.
    pub fn new(cards: Vec<C>) -> Self {
        Self {
            draw_pile: cards,
            discard_pile: Vec::new(),
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.draw_pile.shuffle(rng);
    }

    /// Take the top card of the draw pile.
    pub fn draw(&mut self) -> Result<C, GameError> {
        self.draw_pile.pop().ok_or(GameError::EmptyDeck)
    }

    /// Draw, reclaiming the discard pile (minus its top card) first when the
    /// draw pile is exhausted.
    pub fn draw_or_reclaim<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<C, GameError> {
        if self.draw_pile.is_empty() && !self.reclaim_discard(rng) {
            return Err(GameError::NoCardsAvailable);
        }
        self.draw()
    }

    /// Draw, recycling the whole discard pile first when the draw pile is
    /// exhausted.
    pub fn draw_or_recycle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<C, GameError> {
        if self.draw_pile.is_empty() && !self.recycle_discard(rng) {
            return Err(GameError::NoCardsAvailable);
        }
        self.draw()
    }

    /// Move every discard except the top card back into the draw pile and
    /// shuffle. Returns `false` (and does nothing) when the discard pile has
    /// at most one card.
    pub fn reclaim_discard<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.discard_pile.len() <= 1 {
            return false;
        }
        let top = self.discard_pile.pop();
        self.draw_pile.extend(self.discard_pile.drain(..).map(|mut card| {
            card.reset();
            card
        }));
        self.discard_pile.extend(top);
        self.shuffle(rng);
        true
    }

    /// Move the entire discard pile back into the draw pile and shuffle.
    pub fn recycle_discard<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.discard_pile.is_empty() {
            return false;
        }
        self.draw_pile.extend(self.discard_pile.drain(..).map(|mut card| {
            card.reset();
            card
        }));
        self.shuffle(rng);
        true
    }

    pub fn discard(&mut self, card: C) {
        self.discard_pile.push(card);
    }

    /// Put cards beneath the current top discard so the visible card doesn't
    /// change.
    pub fn tuck_under_top<I: IntoIterator<Item = C>>(&mut self, cards: I) {
        let top = self.discard_pile.pop();
        self.discard_pile.extend(cards);
        self.discard_pile.extend(top);
    }

    pub fn put_on_bottom(&mut self, mut card: C) {
        card.reset();
        self.draw_pile.insert(0, card);
    }

    /// Return cards to the draw pile without shuffling.
    pub fn gather<I: IntoIterator<Item = C>>(&mut self, cards: I) {
        self.draw_pile.extend(cards.into_iter().map(|mut card| {
            card.reset();
            card
        }));
    }

    /// Fold the discard pile back into the draw pile without shuffling.
    pub fn gather_discards(&mut self) {
        let discards: Vec<C> = self.discard_pile.drain(..).collect();
        self.gather(discards);
    }

    /// Pull the first draw-pile card matching `pred`, wherever it sits.
    pub fn take_from_draw_pile<P: FnMut(&C) -> bool>(&mut self, pred: P) -> Option<C> {
        let idx = self.draw_pile.iter().position(pred)?;
        Some(self.draw_pile.remove(idx))
    }

    pub fn take_top_discard(&mut self) -> Option<C> {
        self.discard_pile.pop()
    }

    pub fn top_discard(&self) -> Option<&C> {
        self.discard_pile.last()
    }

    pub fn draw_count(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discard_count(&self) -> usize {
        self.discard_pile.len()
    }

    /// Total cards held by both piles.
    pub fn len(&self) -> usize {
        self.draw_pile.len() + self.discard_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every card in both piles, draw pile first.
    pub fn cards(&self) -> impl Iterator<Item = &C> {
        self.draw_pile.iter().chain(self.discard_pile.iter())
    }
}
