use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};
use uno::{Game, PriorityStrategy, Strategy};

use crate::{
    spawn_dispatcher, Activity, CallOutWatchdog, Engine, NotificationBus, SessionConfig,
    TurnScheduler,
};

/// One game against the machine, with everything running around it.
///
/// Owns the engine, the notification dispatcher, and the two background
/// activities. Observers should be registered on [`Session::bus()`] before
/// [`Session::start()`], or they miss the deal.
pub struct Session {
    config: SessionConfig,
    seed: u64,
    engine: Engine,
    bus: Arc<Mutex<NotificationBus>>,
    strategy: Option<Box<dyn Strategy + Send>>,
    dispatcher: Option<JoinHandle<()>>,
    scheduler: Option<Activity>,
    watchdog: Option<Activity>,
}

impl Session {
    /// A session around a freshly shuffled game.
    pub fn new(config: SessionConfig) -> anyhow::Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "Shuffling a new deck");
        Self::with_game(Game::with_seed(seed), config, seed)
    }

    /// A session around `game`, which may already be dealt. `seed` only drives
    /// the watchdog.
    pub fn with_game(game: Game, config: SessionConfig, seed: u64) -> anyhow::Result<Self> {
        config.validate()?;
        let (tx, rx) = mpsc::channel();
        let bus = Arc::new(Mutex::new(NotificationBus::new()));
        let dispatcher = spawn_dispatcher(bus.clone(), rx)
            .context("Could not spawn the notification dispatcher")?;
        Ok(Self {
            config,
            seed,
            engine: Engine::new(game, tx),
            bus,
            strategy: Some(Box::new(PriorityStrategy)),
            dispatcher: Some(dispatcher),
            scheduler: None,
            watchdog: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The handle for human input.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn bus(&self) -> MutexGuard<'_, NotificationBus> {
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deals, if that has not happened yet, and starts the turn scheduler and
    /// the watchdog. Calling it again does nothing.
    pub fn start(&mut self) -> anyhow::Result<()> {
        let Some(strategy) = self.strategy.take() else {
            return Ok(());
        };
        self.engine.start()?;

        let think_time = self.config.think_time();
        let scheduler = TurnScheduler::new(self.engine.clone(), strategy, think_time);
        let scheduler = Activity::spawn("turn-scheduler", move || scheduler.run())
            .context("Could not spawn the turn scheduler")?;
        self.scheduler = Some(scheduler);

        let watchdog = CallOutWatchdog::new(
            self.engine.clone(),
            StdRng::seed_from_u64(self.seed.wrapping_add(1)),
            self.config.watchdog_interval(),
        );
        let watchdog = Activity::spawn("call-out-watchdog", move || watchdog.run())
            .context("Could not spawn the watchdog")?;
        self.watchdog = Some(watchdog);
        info!("Session started");
        Ok(())
    }

    /// Whether the scheduler and the watchdog are both still alive.
    pub fn is_running(&self) -> bool {
        [&self.scheduler, &self.watchdog]
            .into_iter()
            .all(|activity| activity.as_ref().is_some_and(Activity::is_running))
    }

    /// Stops and joins the background activities, then delivers any pending
    /// notifications. Also happens on drop.
    pub fn shutdown(mut self) {
        self.stop_all();
    }

    fn stop_all(&mut self) {
        self.engine.stop();
        for activity in [self.scheduler.take(), self.watchdog.take()].into_iter().flatten() {
            debug!(activity = activity.name(), "Joining");
            activity.join();
        }
        self.engine.close_outbox();
        if let Some(dispatcher) = self.dispatcher.take() {
            if dispatcher.join().is_err() {
                error!("Notification dispatcher panicked");
            }
            info!("Session shut down");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_all();
    }
}
