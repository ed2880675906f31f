use crate::Card;

/// The face-up card everybody has to follow.
#[derive(Clone, Debug, Default)]
pub struct Table {
    top: Option<Card>,
}

impl Table {
    pub fn new() -> Self {
        Self { top: None }
    }

    /// `None` only before the game has been dealt.
    pub fn top(&self) -> Option<Card> {
        self.top
    }

    /// Puts a card on top and returns the one it covers.
    pub(crate) fn place(&mut self, card: Card) -> Option<Card> {
        self.top.replace(card)
    }
}
