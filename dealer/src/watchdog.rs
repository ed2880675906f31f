use std::ops::RangeInclusive;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{info, warn};
use uno::{Game, PlayerId};

use crate::Engine;

/// What a single watchdog check did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// The human held one undeclared card and drew a penalty card.
    pub human_penalized: bool,
    pub machine_declared: bool,
}

/// Polls the hands at random intervals and enforces the UNO call.
///
/// A human caught holding one undeclared card draws a penalty card. The
/// machine announces its own last card, but only on the check after the one
/// that first saw it, which leaves the human a window to call it out first.
pub struct CallOutWatchdog {
    engine: Engine,
    rng: StdRng,
    interval_ms: RangeInclusive<u64>,
    // The machine's one-card episode seen on an earlier check.
    machine_episode_seen: Option<u64>,
}

impl CallOutWatchdog {
    pub fn new(engine: Engine, rng: StdRng, interval: RangeInclusive<Duration>) -> Self {
        let interval_ms = interval.start().as_millis() as u64..=interval.end().as_millis() as u64;
        Self {
            engine,
            rng,
            interval_ms,
            machine_episode_seen: None,
        }
    }

    /// Runs until the game is over or a stop is requested.
    pub fn run(mut self) {
        info!(
            min_ms = *self.interval_ms.start(),
            max_ms = *self.interval_ms.end(),
            "Call-out watchdog started"
        );
        loop {
            let interval = self.next_interval();
            if !self.engine.pause(interval) {
                break;
            }
            self.tick();
        }
        info!("Call-out watchdog stopped");
    }

    fn next_interval(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(self.interval_ms.clone()))
    }

    /// One check, as a single critical section.
    pub fn tick(&mut self) -> Tick {
        let seen = &mut self.machine_episode_seen;
        self.engine.mutate(|game| check_declarations(game, seen))
    }
}

fn check_declarations(game: &mut Game, machine_episode_seen: &mut Option<u64>) -> Tick {
    let mut tick = Tick::default();
    if game.phase().is_finished() {
        return tick;
    }

    if game.player(PlayerId::Human).owes_declaration() {
        match game.declare_uno(PlayerId::Machine, PlayerId::Human) {
            Ok(penalized) => {
                tick.human_penalized = penalized;
                info!("Human forgot to call UNO and draws a penalty card");
            }
            Err(err) => warn!(%err, "Could not penalize the human"),
        }
    }

    let machine = game.player(PlayerId::Machine);
    if machine.owes_declaration() {
        let episode = machine.one_card_episode();
        if *machine_episode_seen == episode {
            tick.machine_declared = game.declare(PlayerId::Machine);
            if tick.machine_declared {
                info!("Machine calls UNO");
            }
        } else {
            *machine_episode_seen = episode;
        }
    }
    tick
}
