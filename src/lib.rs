pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod game;
pub mod rules;

pub use config::{AppConfig, ConfigChain};
pub use core::{Board, HashSeeds, Move, Player};
pub use engine::{SearchController, Searcher, evaluate};
pub use error::{MillError, Result};
pub use game::GameControl;
pub use rules::{GameResult, RuleOracle, RulePreset, RuleSet, perft};
