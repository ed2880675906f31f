use crate::{Face, Hand};

/// Decides which card the machine puts down.
pub trait Strategy {
    /// Returns the position in `hand` of the card to play on `top`, or `None`
    /// to draw instead. The returned card must be playable on `top`.
    fn choose(&mut self, hand: &Hand, top: Face) -> Option<usize>;
}

/// Plays a wild-class card whenever it holds one, otherwise the first
/// playable card in hand order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityStrategy;

impl Strategy for PriorityStrategy {
    fn choose(&mut self, hand: &Hand, top: Face) -> Option<usize> {
        hand.iter()
            .position(|card| card.face.is_wild_class())
            .or_else(|| hand.iter().position(|card| card.face.can_be_played_on(top)))
    }
}
