//! Static evaluation from the point of view of the player to move.

use serde::{Deserialize, Serialize};

use crate::core::{Board, Player};
use crate::rules::RuleOracle;

use super::search::EVAL_INFTY;

/// Weights of the evaluation terms
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub material: f32,
    pub freedom: f32,
    pub mills: f32,
    /// Scale of the experience offset added at the search root
    pub experience: f32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights {
            material: 1.0,
            freedom: 0.2,
            mills: 0.8,
            experience: 1.0,
        }
    }
}

/// Evaluate `board` for the player to move.
///
/// Returns `-EVAL_INFTY` when the player to move is lost: fewer than three
/// pieces, or no free neighbor for any piece while it can neither set nor fly.
pub fn evaluate(board: &Board, rules: &dyn RuleOracle, weights: &EvalWeights) -> f32 {
    let me = board.current_player();
    let opp = me.opponent();

    if board.pieces_left(me) < 3 {
        return -EVAL_INFTY;
    }

    let mut eval =
        weights.material * (board.pieces_left(me) as f32 - board.pieces_left(opp) as f32);

    let my_freedom = freedom(board, rules, me);
    let opp_freedom = freedom(board, rules, opp);
    if my_freedom == 0
        && board.pieces_on_board(me) > 0
        && !rules.may_fly(board, me)
        && board.pieces_to_place(me) == 0
    {
        return -EVAL_INFTY;
    }
    eval += weights.freedom * (my_freedom as f32 - opp_freedom as f32);

    let (my_mills, opp_mills) = closed_mills(board, rules, me);
    eval += weights.mills * (my_mills as f32 - opp_mills as f32);

    eval
}

/// Sum of empty neighbors over all pieces of `player`
fn freedom(board: &Board, rules: &dyn RuleOracle, player: Player) -> u32 {
    let topology = rules.topology();
    topology
        .positions()
        .filter(|&p| board.cell(p) == Some(player))
        .map(|p| {
            topology
                .neighbors(p)
                .iter()
                .filter(|&&n| board.is_empty(n))
                .count() as u32
        })
        .sum()
}

/// Closed mills of `me` and of the opponent
fn closed_mills(board: &Board, rules: &dyn RuleOracle, me: Player) -> (u32, u32) {
    let mut mine = 0;
    let mut theirs = 0;
    for mill in rules.topology().mills() {
        let owner = board.cell(mill[0]);
        if owner.is_some() && mill[1..].iter().all(|&p| board.cell(p) == owner) {
            if owner == Some(me) {
                mine += 1;
            } else {
                theirs += 1;
            }
        }
    }
    (mine, theirs)
}
