//! Move ordering: table move first, random order behind it at the root.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::core::Move;

/// Put `tt_move` in front and, when `shuffle` is given, randomize the rest.
pub(super) fn order_moves(
    moves: &mut [Move],
    tt_move: Option<&Move>,
    shuffle: Option<&mut StdRng>,
) {
    let mut fixed = 0;
    if let Some(tt_move) = tt_move
        && let Some(idx) = moves.iter().position(|m| m == tt_move)
    {
        moves.swap(0, idx);
        fixed = 1;
    }

    if let Some(rng) = shuffle {
        moves[fixed..].shuffle(rng);
    }
}
