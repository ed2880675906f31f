use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace};
use uno::{Card, GameView, Phase, PlayerId};

/// What part of the view a [`Notification::ViewChanged`] is about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewChange {
    Hands,
    Table { top: Card },
    Turn { phase: Phase },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Won { winner: PlayerId },
    /// The deck ran out.
    Aborted,
}

/// A change to the game, with a snapshot taken right after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    ViewChanged { change: ViewChange, view: GameView },
    GameEnded { outcome: GameOutcome, view: GameView },
}

impl Notification {
    pub fn view(&self) -> &GameView {
        match self {
            Notification::ViewChanged { view, .. } => view,
            Notification::GameEnded { view, .. } => view,
        }
    }
}

pub type SubscriptionId = u64;

type ViewObserver = Box<dyn FnMut(&ViewChange, &GameView) + Send>;
type EndObserver = Box<dyn FnMut(GameOutcome, &GameView) + Send>;

/// Delivers notifications to observers, outside of the game lock.
///
/// Observers run on the dispatcher thread, one notification at a time and in
/// the order the changes were made. The game-ended observers are called at
/// most once per bus, no matter how many end notifications arrive.
#[derive(Default)]
pub struct NotificationBus {
    next_id: SubscriptionId,
    view_observers: Vec<(SubscriptionId, ViewObserver)>,
    end_observers: Vec<(SubscriptionId, EndObserver)>,
    ended: bool,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_view_changed(
        &mut self,
        observer: impl FnMut(&ViewChange, &GameView) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.view_observers.push((id, Box::new(observer)));
        id
    }

    pub fn on_game_ended(
        &mut self,
        observer: impl FnMut(GameOutcome, &GameView) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.end_observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether there was such a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.view_observers.len() + self.end_observers.len();
        self.view_observers.retain(|(other, _)| *other != id);
        self.end_observers.retain(|(other, _)| *other != id);
        before != self.view_observers.len() + self.end_observers.len()
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn dispatch(&mut self, notification: &Notification) {
        match notification {
            Notification::ViewChanged { change, view } => {
                trace!(?change, "Dispatching view change");
                for (_, observer) in &mut self.view_observers {
                    observer(change, view);
                }
            }
            Notification::GameEnded { outcome, view } => {
                if self.ended {
                    debug!(?outcome, "Ignoring repeated end of game");
                    return;
                }
                self.ended = true;
                for (_, observer) in &mut self.end_observers {
                    observer(*outcome, view);
                }
            }
        }
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Spawns the thread that feeds everything received on `inbox` into `bus`.
/// It finishes once every sender is gone and the channel is drained.
pub(crate) fn spawn_dispatcher(
    bus: Arc<Mutex<NotificationBus>>,
    inbox: Receiver<Notification>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("notifications".into())
        .spawn(move || {
            for notification in inbox {
                bus.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .dispatch(&notification);
            }
            debug!("Notification dispatcher finished");
        })
}
