use serde::Serialize;

use crate::{Card, CardId, GameError};

/// The ordered cards held by one player.
///
/// New cards go to the end. Cards only leave by position, and the caller has
/// to name the card it expects there, so a stale index can never take out a
/// different card with the same face.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|card| card.id == id)
    }

    pub(crate) fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Removes the card at `index`, provided it is the card with id `expected`.
    pub(crate) fn remove_at(&mut self, index: usize, expected: CardId) -> Result<Card, GameError> {
        match self.cards.get(index) {
            Some(card) if card.id == expected => Ok(self.cards.remove(index)),
            _ => Err(GameError::InvalidCardPosition { index, expected }),
        }
    }

    /// The at most `width` cards starting at position `start`.
    ///
    /// Positions inside the window are `start + i`, so they stay valid as
    /// indices into the hand until the hand changes.
    pub fn window(&self, start: usize, width: usize) -> &[Card] {
        let start = start.min(self.cards.len());
        let end = start.saturating_add(width).min(self.cards.len());
        &self.cards[start..end]
    }
}

impl<'a> IntoIterator for &'a Hand {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        Self {
            cards: Vec::from_iter(iter),
        }
    }
}
