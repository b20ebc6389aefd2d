//! Game rules
//!
//! The search only talks to the rules through [`RuleOracle`]: generate the
//! legal moves of a position, decide whether it is decided, and compute a
//! position id that is equal for all symmetric variants of a position.
//! [`RuleSet`] is the concrete implementation for every supported variant.

mod movegen;
mod ruleset;

use std::sync::Arc;

use crate::core::{Board, HashSeeds, Move, Player, Topology};

pub use ruleset::{RulePreset, RuleSet};

/// Final result of a game
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub enum GameResult {
    Winner(Player),
    Tie,
}

impl GameResult {
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Winner(p) => Some(p),
            GameResult::Tie => None,
        }
    }
}

/// Everything the engine needs to know about the rules of the game.
///
/// Implementations must be pure functions of the board and their own static
/// configuration.
pub trait RuleOracle: Send + Sync {
    fn topology(&self) -> &Topology;

    /// Pieces each player starts with
    fn n_pieces(&self) -> u8;

    /// Repetitions of a position that end the game in a tie (0 = never)
    fn tie_after_repeats(&self) -> u32;

    /// Whether `player` may move a piece to any empty cell
    fn may_fly(&self, board: &Board, player: Player) -> bool;

    /// Append all legal moves of the player to move to `out`
    fn generate_moves(&self, board: &Board, out: &mut Vec<Move>);

    /// Win or loss of the position. Repetition ties need the game history
    /// and are decided by the caller.
    fn outcome(&self, board: &Board) -> Option<GameResult>;

    /// Position id, identical for all symmetric variants of a position
    fn canonical_id(&self, board: &Board) -> u64;

    /// Empty start position of this variant
    fn start_board(&self, seeds: Arc<HashSeeds>) -> Board {
        Board::new(seeds, self.n_pieces())
    }
}

/// Count the leaf nodes of the game tree to `depth`; decided positions are leaves.
pub fn perft(rules: &dyn RuleOracle, board: &mut Board, depth: u32) -> u64 {
    if depth == 0 || rules.outcome(board).is_some() {
        return 1;
    }

    let mut moves = Vec::new();
    rules.generate_moves(board, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in &moves {
        board.apply_move(mv);
        nodes += perft(rules, board, depth - 1);
        board.undo_move(mv);
    }
    nodes
}
