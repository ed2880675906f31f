use serde::{Deserialize, Serialize};

use crate::{Card, CardId, GameError, Hand};

/// The two seats at the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerId {
    Human,
    Machine,
}

impl PlayerId {
    pub const BOTH: [PlayerId; 2] = [PlayerId::Human, PlayerId::Machine];

    pub fn opponent(self) -> Self {
        match self {
            PlayerId::Human => PlayerId::Machine,
            PlayerId::Machine => PlayerId::Human,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerId::Human => write!(f, "Human Player"),
            PlayerId::Machine => write!(f, "Machine Player"),
        }
    }
}

/// The state of one player during one game.
///
/// Besides the hand this tracks the mandatory declaration: whenever the hand
/// shrinks or grows to exactly one card, a new "one-card episode" starts and
/// the player owes a declaration for it. Leaving the one-card state ends the
/// episode.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    hand: Hand,
    episodes: u64,
    one_card_episode: Option<u64>,
    declared: bool,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            hand: Hand::new(),
            episodes: 0,
            one_card_episode: None,
            declared: false,
        }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    /// The number of the current one-card episode, if the player holds exactly one card.
    pub fn one_card_episode(&self) -> Option<u64> {
        self.one_card_episode
    }

    pub fn has_declared(&self) -> bool {
        self.declared
    }

    /// Holding one card without having declared it.
    pub fn owes_declaration(&self) -> bool {
        self.one_card_episode.is_some() && !self.declared
    }

    /// Returns whether the declaration was accepted, i.e. whether one was owed.
    pub(crate) fn declare(&mut self) -> bool {
        if self.owes_declaration() {
            self.declared = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn receive(&mut self, card: Card) {
        self.hand.push(card);
        self.sync_declaration();
    }

    pub(crate) fn give_up(&mut self, index: usize, expected: CardId) -> Result<Card, GameError> {
        let card = self.hand.remove_at(index, expected)?;
        self.sync_declaration();
        Ok(card)
    }

    fn sync_declaration(&mut self) {
        if self.hand.len() == 1 {
            if self.one_card_episode.is_none() {
                self.episodes += 1;
                self.one_card_episode = Some(self.episodes);
                self.declared = false;
            }
        } else {
            self.one_card_episode = None;
            self.declared = false;
        }
    }
}
