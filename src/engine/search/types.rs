//! Search limits, configuration, stats, and score constants.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Move, Variation};
use crate::engine::eval::EvalWeights;

/// Value of a position that is lost for the player to move
pub const EVAL_INFTY: f32 = 10000.0;
/// Scores beyond this magnitude are forced wins or losses; the distance to
/// `EVAL_INFTY` is the number of plies to the end of the game.
pub const EVAL_WIN: f32 = 9000.0;
/// The clock is only read at the root and above this remaining depth
pub const TIME_CHECK_DEPTH: i32 = 5;

pub const DEFAULT_MAX_TIME_MS: u64 = 1000;
pub const DEFAULT_MAX_DEPTH: u32 = 25;

/// Shrink a decided score by one ply while passing it to the parent.
#[inline]
pub fn add_ply(eval: f32) -> f32 {
    if eval > EVAL_WIN {
        eval - 1.0
    } else if eval < -EVAL_WIN {
        eval + 1.0
    } else {
        eval
    }
}

/// Inverse of [`add_ply`], applied to a window passed down to a child.
#[inline]
pub fn sub_ply(eval: f32) -> f32 {
    if eval > EVAL_WIN {
        eval + 1.0
    } else if eval < -EVAL_WIN {
        eval - 1.0
    } else {
        eval
    }
}

/// Plies until the game ends for a decided score
#[inline]
pub fn plies_until_end(eval: f32) -> u32 {
    (EVAL_INFTY - eval.abs()) as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    #[serde(with = "millis")]
    pub max_time: Duration,
    pub max_depth: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_time: Duration::from_millis(DEFAULT_MAX_TIME_MS),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything that shapes one engine's search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub limits: SearchLimits,
    pub weights: EvalWeights,
    /// Shuffle root moves behind the table move
    pub randomize_root: bool,
    pub use_table: bool,
    /// Seed of the root shuffle; a fresh random seed when unset
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limits: SearchLimits::default(),
            weights: EvalWeights::default(),
            randomize_root: true,
            use_table: true,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// Nodes of the last iteration
    pub nodes: u64,
    pub total_nodes: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
}

/// Outcome of a search that committed a move
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    /// Value for the player to move at the root
    pub value: f32,
    /// Last fully completed iteration (0 if interrupted during the first)
    pub depth: u32,
    pub variation: Variation,
    pub stats: SearchStats,
}

/// Raised inside the recursion once the search has to stop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchAborted;

/// Receives progress while a search runs
pub trait SearchListener: Send + Sync {
    /// Fraction of the time budget used, in [0, 1]
    fn on_progress(&self, _fraction: f32) {}

    /// Human readable line about the current best variation
    fn on_thinking(&self, _line: &str) {}
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
