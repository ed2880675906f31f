use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{standard_catalog, Card, CardId, DeckExhausted, Hand};

/// The draw pile and the discard pile.
///
/// Cards are drawn from the end of the draw pile. The card on the table is
/// also the newest entry of the discard pile.
#[derive(Clone, Debug)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    rng: StdRng,
}

impl Deck {
    /// Shuffles `cards` into a fresh draw pile.
    pub fn new(mut cards: Vec<Card>, mut rng: StdRng) -> Self {
        cards.shuffle(&mut rng);
        Self {
            draw_pile: cards,
            discard_pile: Vec::new(),
            rng,
        }
    }

    /// A shuffled [standard catalog](crate::standard_catalog).
    pub fn standard(rng: StdRng) -> Self {
        Self::new(standard_catalog(), rng)
    }

    /// A deck in exactly the given order. The last card of `draw_pile` is
    /// drawn first. `rng` is only used when the discard pile is reshuffled.
    pub fn stacked(draw_pile: Vec<Card>, discard_pile: Vec<Card>, rng: StdRng) -> Self {
        Self {
            draw_pile,
            discard_pile,
            rng,
        }
    }

    pub fn draw_pile(&self) -> &[Card] {
        &self.draw_pile
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    pub fn len(&self) -> usize {
        self.draw_pile.len() + self.discard_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_pile.is_empty() && self.discard_pile.is_empty()
    }

    /// Takes the top card of the draw pile.
    ///
    /// An empty draw pile is first refilled from the discard pile, except for
    /// the card still lying on the table (`on_table`) and anything held in
    /// `hands`.
    pub fn draw(
        &mut self,
        on_table: Option<CardId>,
        hands: &[&Hand],
    ) -> Result<Card, DeckExhausted> {
        if self.draw_pile.is_empty() {
            self.replenish(on_table, hands);
        }
        self.draw_pile.pop().ok_or(DeckExhausted)
    }

    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    fn replenish(&mut self, on_table: Option<CardId>, hands: &[&Hand]) {
        let mut retained = Vec::with_capacity(1);
        let mut refill = Vec::with_capacity(self.discard_pile.len());
        for card in self.discard_pile.drain(..) {
            if Some(card.id) == on_table {
                retained.push(card);
            } else if hands.iter().any(|hand| hand.contains(card.id)) {
                // Held cards are never in the discard pile; drop any stale copy
                // rather than deal it twice.
                continue;
            } else {
                refill.push(card);
            }
        }
        refill.shuffle(&mut self.rng);
        self.draw_pile.append(&mut refill);
        self.discard_pile = retained;
    }
}
