use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, trace, warn};
use uno::{Card, CardId, Game, GameError, GameEvent, GameView, Phase, PlayOutcome, PlayerId};

use crate::bus::{GameOutcome, Notification, ViewChange};

/// A shared handle to one game.
///
/// All reads and writes of the game go through a single mutex, and every
/// public operation is exactly one critical section. After each one, the
/// changes are sent to the notification dispatcher together with a snapshot
/// of the game, still under the lock, so notifications arrive in the order
/// of the mutations and always describe a completely applied mutation.
///
/// The condition variable is signalled after every mutation and on stop. The
/// background activities wait on it instead of sleeping, so they never hold
/// the lock while idle and wake up as soon as there is something to do.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

struct Shared {
    inner: Mutex<Inner>,
    changed: Condvar,
}

struct Inner {
    game: Game,
    stop_requested: bool,
    // `None` once the session has shut down.
    outbox: Option<Sender<Notification>>,
}

impl Inner {
    fn should_exit(&self) -> bool {
        self.stop_requested || self.game.phase().is_finished()
    }

    fn publish(&mut self) {
        let events = self.game.drain_events();
        if events.is_empty() {
            return;
        }
        let view = self.game.view();
        let Some(outbox) = &self.outbox else {
            trace!(num_events = events.len(), "Dropping events after shutdown");
            return;
        };
        for event in events {
            let notification = match event {
                GameEvent::HandsChanged => Notification::ViewChanged {
                    change: ViewChange::Hands,
                    view: view.clone(),
                },
                GameEvent::TableChanged { top } => Notification::ViewChanged {
                    change: ViewChange::Table { top },
                    view: view.clone(),
                },
                GameEvent::TurnChanged { phase } => Notification::ViewChanged {
                    change: ViewChange::Turn { phase },
                    view: view.clone(),
                },
                GameEvent::GameEnded { winner } => Notification::GameEnded {
                    outcome: GameOutcome::Won { winner },
                    view: view.clone(),
                },
                GameEvent::GameAborted => Notification::GameEnded {
                    outcome: GameOutcome::Aborted,
                    view: view.clone(),
                },
            };
            if outbox.send(notification).is_err() {
                warn!("Notification dispatcher is gone");
                break;
            }
        }
    }
}

impl Engine {
    pub fn new(game: Game, outbox: Sender<Notification>) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    game,
                    stop_requested: false,
                    outbox: Some(outbox),
                }),
                changed: Condvar::new(),
            }),
        }
    }

    // A panic inside a critical section can only come from a bug in the
    // rules; the game state itself is still consistent enough to shut down.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` as one critical section and publishes what it changed.
    pub(crate) fn mutate<T>(&self, f: impl FnOnce(&mut Game) -> T) -> T {
        let mut inner = self.lock();
        let result = f(&mut inner.game);
        inner.publish();
        drop(inner);
        self.shared.changed.notify_all();
        result
    }

    /// Reads the game under the lock.
    pub fn inspect<T>(&self, f: impl FnOnce(&Game) -> T) -> T {
        f(&self.lock().game)
    }

    pub fn phase(&self) -> Phase {
        self.inspect(Game::phase)
    }

    pub fn view(&self) -> GameView {
        self.inspect(Game::view)
    }

    /// Deals the game, unless it was created already dealt. Either way the
    /// initial state is published.
    pub fn start(&self) -> Result<(), GameError> {
        self.mutate(|game| match game.phase() {
            Phase::Setup => game.start(),
            _ => Ok(()),
        })
    }

    pub fn play_card(&self, index: usize, card_id: CardId) -> Result<PlayOutcome, GameError> {
        let result = self.mutate(|game| game.play_card(PlayerId::Human, index, card_id));
        match &result {
            Ok(outcome) => info!(
                card = %outcome.card,
                extra_turn = outcome.requires_extra_turn,
                "Human played a card"
            ),
            Err(err) => debug!(%err, index, "Human play rejected"),
        }
        result
    }

    /// Draws one card for the human, which ends their turn.
    pub fn draw_card(&self) -> Result<Card, GameError> {
        let result = self.mutate(|game| game.draw_and_end_turn(PlayerId::Human));
        match &result {
            Ok(card) => debug!(%card, "Human drew a card"),
            Err(err) => debug!(%err, "Human draw rejected"),
        }
        result
    }

    pub fn pass_turn(&self) -> Result<(), GameError> {
        let result = self.mutate(|game| game.pass_turn(PlayerId::Human));
        if let Err(err) = &result {
            debug!(%err, "Human pass rejected");
        }
        result
    }

    /// The human announces their last card. Returns whether it counted.
    pub fn declare_uno(&self) -> bool {
        let accepted = self.mutate(|game| game.declare(PlayerId::Human));
        debug!(accepted, "Human declared UNO");
        accepted
    }

    /// The human calls out the machine. Returns whether the machine was penalized.
    pub fn accuse_opponent(&self) -> Result<bool, GameError> {
        let result = self.mutate(|game| game.declare_uno(PlayerId::Human, PlayerId::Machine));
        if let Ok(true) = result {
            info!("Human caught the machine without UNO");
        }
        result
    }

    /// Asks the background activities to finish. They do so after their
    /// current critical section, at the latest.
    pub fn stop(&self) {
        self.lock().stop_requested = true;
        self.shared.changed.notify_all();
    }

    /// Blocks until `player` holds the turn. Returns `false` instead if the
    /// game finishes or a stop is requested first.
    pub(crate) fn wait_for_turn(&self, player: PlayerId) -> bool {
        let inner = self.lock();
        let inner = self
            .shared
            .changed
            .wait_while(inner, |inner| {
                !inner.should_exit() && inner.game.phase().turn() != Some(player)
            })
            .unwrap_or_else(PoisonError::into_inner);
        !inner.should_exit()
    }

    /// Waits for `duration` without holding the lock. Returns `false` as soon
    /// as the game finishes or a stop is requested.
    pub(crate) fn pause(&self, duration: Duration) -> bool {
        let inner = self.lock();
        let (inner, _) = self
            .shared
            .changed
            .wait_timeout_while(inner, duration, |inner| !inner.should_exit())
            .unwrap_or_else(PoisonError::into_inner);
        !inner.should_exit()
    }

    /// Drops the sending end of the notification channel, which lets the
    /// dispatcher finish once it has delivered everything queued so far.
    pub(crate) fn close_outbox(&self) {
        self.lock().outbox = None;
    }
}
