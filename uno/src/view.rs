use serde::Serialize;

use crate::{Card, Hand, Phase, PlayerId};

/// Something observable that happened to a game.
///
/// A [`Game`](crate::Game) queues these in the order the changes were made;
/// drain them with [`Game::drain_events()`](crate::Game::drain_events).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A hand grew or shrank, or a declaration was made.
    HandsChanged,
    /// A card was put on the table.
    TableChanged { top: Card },
    /// The turn moved, or the game left the running phases.
    TurnChanged { phase: Phase },
    /// Queued exactly once per game, right after the winning mutation.
    GameEnded { winner: PlayerId },
    /// The deck ran out. Queued at most once, and never together with `GameEnded`.
    GameAborted,
}

/// A consistent copy of everything the presentation needs to draw the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub phase: Phase,
    pub human_hand: Hand,
    /// The machine's cards are face down, only their number is shown.
    pub machine_card_count: usize,
    pub top_card: Option<Card>,
    pub draw_pile_len: usize,
    pub discard_pile_len: usize,
    pub human_owes_declaration: bool,
    pub machine_owes_declaration: bool,
}

impl GameView {
    /// The presentation may only take human input while this is true.
    pub fn accepts_human_input(&self) -> bool {
        self.phase == Phase::HumanTurn
    }
}
