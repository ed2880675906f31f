use std::time::Duration;

use tracing::{debug, info, warn};
use uno::{Card, Game, GameError, PlayOutcome, PlayerId, Strategy};

use crate::Engine;

/// What the machine did with one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineMove {
    Played(PlayOutcome),
    /// Nothing was playable, so it drew a card and its turn ended.
    Drew(Card),
}

/// Makes the machine's moves, in the background.
///
/// Sleeps until the turn is handed to the machine, then thinks for a while
/// before each move. The machine keeps moving as long as its cards grant
/// extra turns.
pub struct TurnScheduler {
    engine: Engine,
    strategy: Box<dyn Strategy + Send>,
    think_time: Duration,
}

impl TurnScheduler {
    pub fn new(engine: Engine, strategy: Box<dyn Strategy + Send>, think_time: Duration) -> Self {
        Self {
            engine,
            strategy,
            think_time,
        }
    }

    /// Runs until the game is over or a stop is requested.
    pub fn run(mut self) {
        info!(think_time_ms = self.think_time.as_millis() as u64, "Turn scheduler started");
        while self.engine.wait_for_turn(PlayerId::Machine) {
            self.play_turn();
        }
        info!("Turn scheduler stopped");
    }

    fn play_turn(&mut self) {
        loop {
            if !self.engine.pause(self.think_time) {
                return;
            }
            match self.step() {
                Ok(MachineMove::Played(outcome)) if outcome.requires_extra_turn => {
                    debug!(card = %outcome.card, "Machine moves again");
                }
                Ok(_) => return,
                Err(err) => {
                    warn!(%err, "Machine move failed");
                    return;
                }
            }
        }
    }

    /// Chooses and makes one move as a single critical section.
    pub fn step(&mut self) -> Result<MachineMove, GameError> {
        let strategy = self.strategy.as_mut();
        self.engine.mutate(|game| machine_move(game, strategy))
    }
}

fn machine_move(
    game: &mut Game,
    strategy: &mut (dyn Strategy + Send),
) -> Result<MachineMove, GameError> {
    let top = game.top_card().ok_or(GameError::NotStarted)?;
    let hand = game.hand(PlayerId::Machine);
    let choice = strategy
        .choose(hand, top.face)
        .and_then(|index| hand.get(index).map(|card| (index, card.id)));

    let result = match choice {
        Some((index, card_id)) => match game.play_card(PlayerId::Machine, index, card_id) {
            Ok(outcome) => Ok(MachineMove::Played(outcome)),
            Err(GameError::IllegalMove { card, top }) => {
                warn!(%card, %top, "Strategy chose an unplayable card, drawing instead");
                game.draw_and_end_turn(PlayerId::Machine).map(MachineMove::Drew)
            }
            Err(err) => Err(err),
        },
        None => game.draw_and_end_turn(PlayerId::Machine).map(MachineMove::Drew),
    };
    let cards_left = game.hand(PlayerId::Machine).len();
    match &result {
        Ok(MachineMove::Played(outcome)) => {
            info!(card = %outcome.card, cards_left, "Machine played a card")
        }
        Ok(MachineMove::Drew(_)) => info!(cards_left, "Machine drew a card"),
        Err(_) => {}
    }
    result
}
