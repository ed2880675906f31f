use crate::{Card, CardId, PlayerId};

/// The error type for [`Deck::draw()`](crate::Deck::draw).
///
/// Returned when the draw pile is empty and the discard pile has nothing
/// left to reshuffle into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeckExhausted;

impl std::error::Error for DeckExhausted {}

impl std::fmt::Display for DeckExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No cards left to draw, even after reshuffling the discard pile")
    }
}

/// The error type for all operations on a [`Game`](crate::Game).
///
/// Every operation that returns one of these, apart from
/// [`GameError::DeckExhausted`], leaves the game unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    /// Fatal for the game, which is aborted.
    DeckExhausted(DeckExhausted),
    /// The card does not match the card on the table.
    IllegalMove { card: Card, top: Card },
    /// The hand does not hold the expected card at that position. This means
    /// that whoever addressed the card has an outdated picture of the hand.
    InvalidCardPosition { index: usize, expected: CardId },
    OutOfTurn { player: PlayerId },
    NotStarted,
    AlreadyStarted,
    GameFinished,
    InvalidLayout { reason: &'static str },
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::DeckExhausted(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::DeckExhausted(_) => {
                write!(f, "The deck ran out of cards, the game cannot continue")
            }
            GameError::IllegalMove { card, top } => write!(
                f,
                "{} cannot be played on {}, it must match its color or value",
                card, top
            ),
            GameError::InvalidCardPosition { index, expected } => write!(
                f,
                "Expected card #{} at position {} of the hand, but it is not there",
                expected.0, index
            ),
            GameError::OutOfTurn { player } => write!(f, "It is not the turn of the {}", player),
            GameError::NotStarted => write!(f, "The game has not been started yet"),
            GameError::AlreadyStarted => write!(f, "The game has already been started"),
            GameError::GameFinished => write!(f, "The game is already over"),
            GameError::InvalidLayout { reason } => write!(f, "Invalid layout: {}", reason),
        }
    }
}

impl From<DeckExhausted> for GameError {
    fn from(err: DeckExhausted) -> Self {
        GameError::DeckExhausted(err)
    }
}
