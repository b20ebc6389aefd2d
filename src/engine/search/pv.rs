//! Principal variation reconstruction and thinking output.

use crate::core::{Board, Player, Topology, Variation};
use crate::engine::tt::SharedTable;
use crate::rules::RuleOracle;

use super::types::{EVAL_INFTY, EVAL_WIN};

/// Follow the best moves stored in the table from `board`
pub(super) fn variation_from_table(
    tt: &SharedTable,
    rules: &dyn RuleOracle,
    board: &Board,
    max_plies: usize,
) -> Variation {
    let mut variation = Variation::new();
    let mut cur = board.clone();
    let mut legal = Vec::new();
    for _ in 0..max_plies.max(1) {
        let mv = match tt.lock().lookup(cur.hash()) {
            Some(entry) => match &entry.best_move {
                Some(mv) => mv.clone(),
                None => break,
            },
            None => break,
        };
        // a racing writer of a shared table may leave a move of another position
        legal.clear();
        rules.generate_moves(&cur, &mut legal);
        if !legal.contains(&mv) {
            break;
        }
        cur.apply_move(&mv);
        variation.push(mv);
        if rules.outcome(&cur).is_some() {
            break;
        }
    }
    variation
}

/// Score text: "white wins in N moves" for decided scores, else the value
/// from White's point of view.
pub fn format_score(value: f32, mover: Player) -> String {
    if value.abs() > EVAL_WIN {
        let winner = if value > 0.0 { mover } else { mover.opponent() };
        let moves = ((EVAL_INFTY - 1.0 - value.abs()) as u32) / 2 + 1;
        if moves == 1 {
            format!("{} wins the next move", winner)
        } else {
            format!("{} wins in {} moves", winner, moves)
        }
    } else {
        format!("{:.2}", value * mover.sign())
    }
}

/// One human readable line about the current best variation
pub(super) fn thinking_line(
    topology: &Topology,
    variation: &Variation,
    value: f32,
    mover: Player,
    depth: u32,
) -> String {
    let mut text = String::new();
    let mut player = mover;
    let len = variation.len();
    for (i, mv) in variation.iter().enumerate() {
        text.push_str(&mv.notation(topology));
        text.push(' ');
        if player == Player::Black && i + 1 < len {
            text.push_str("/ ");
        }
        player = player.opponent();
    }
    format!("{}({}) [depth {}]", text, format_score(value, mover), depth)
}
