//! Engine components
//!
//! This module contains the decision making part of the program:
//! - Static evaluation
//! - Alpha-beta search with iterative deepening
//! - Transposition table
//! - Experience store learned from finished games
//! - Background search controller

pub mod controller;
pub mod eval;
pub mod experience;
pub mod search;
pub mod tt;

pub use controller::{EngineEvent, SearchController};
pub use eval::{EvalWeights, evaluate};
pub use experience::{ExperienceStore, SharedExperience};
pub use search::{EVAL_INFTY, EVAL_WIN, SearchConfig, SearchLimits, SearchResult, Searcher};
pub use tt::{BoundType, SharedTable, TTEntry, TranspositionTable};
