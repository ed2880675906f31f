//! The rules of a two-player game of UNO between a human and the machine.
//!
//! Everything in here is single-threaded. [`Game`] owns the hands, the deck and
//! the table and is the only way to change them.

pub use cards::*;
pub use deck::*;
pub use errors::*;
pub use game::*;
pub use hand::*;
pub use player::*;
pub use strategy::*;
pub use table::*;
pub use view::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod cards;
mod deck;
mod errors;
mod game;
mod hand;
mod player;
mod strategy;
mod table;
mod view;
mod visualization;
