//! Runs a game of UNO between a human and the machine.
//!
//! The [`Engine`] serializes every access to the game. Around it, a
//! [`Session`] runs the machine's [`TurnScheduler`], the [`CallOutWatchdog`]
//! and the thread that feeds the [`NotificationBus`].
mod activity;
mod bus;
mod config;
mod engine;
mod scheduler;
mod session;
mod watchdog;
pub use activity::*;
pub use bus::*;
pub use config::*;
pub use engine::*;
pub use scheduler::*;
pub use session::*;
pub use watchdog::*;
