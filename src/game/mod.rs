//! Playing games: history, players and the controller between them.

pub mod control;
pub mod history;
pub mod player;

pub use control::GameControl;
pub use history::GameHistory;
pub use player::{PlayerAgent, RandomPlayer};
