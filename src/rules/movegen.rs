//! Legal move generation: set, slide and fly moves plus the captures a
//! closed mill entitles to.

use crate::core::{Board, Move, Position};

use super::RuleOracle;
use super::ruleset::RuleSet;

impl RuleSet {
    pub(super) fn generate(&self, board: &Board, out: &mut Vec<Move>) {
        let me = board.current_player();
        let may_set = board.pieces_to_place(me) > 0;
        let may_move = board.pieces_to_place(me) == 0 || self.lasker;
        let may_fly = self.may_fly(board, me);

        if may_set {
            for to in self.topology.positions() {
                if board.is_empty(to) {
                    self.push_with_takes(out, Move::set(to), board);
                }
            }
        }

        if may_move {
            for from in self.topology.positions() {
                if board.cell(from) != Some(me) {
                    continue;
                }
                if may_fly {
                    for to in self.topology.positions() {
                        if to != from && board.is_empty(to) {
                            self.push_with_takes(out, Move::slide(from, to), board);
                        }
                    }
                } else {
                    for &to in self.topology.neighbors(from) {
                        if board.is_empty(to) {
                            self.push_with_takes(out, Move::slide(from, to), board);
                        }
                    }
                }
            }
        }
    }

    /// Mills the move closes. The moving piece no longer counts on its source cell.
    fn closed_mills(&self, board: &Board, mv: &Move) -> usize {
        let me = board.current_player();
        let from = mv.from();
        self.topology
            .mills_through(mv.to())
            .iter()
            .filter(|pair| {
                pair.iter()
                    .all(|&p| Some(p) != from && board.cell(p) == Some(me))
            })
            .count()
    }

    fn push_with_takes(&self, out: &mut Vec<Move>, mv: Move, board: &Board) {
        let mills = self.closed_mills(board, &mv);
        if mills == 0 {
            out.push(mv);
            return;
        }
        let n_takes = if self.may_take_multiple { mills } else { 1 };
        self.push_takes(out, mv, board, n_takes);
    }

    /// Append `mv` extended by every allowed sequence of `n` captures
    fn push_takes(&self, out: &mut Vec<Move>, mv: Move, board: &Board, n: usize) {
        debug_assert!(n > 0);
        let other = board.current_player().opponent();
        let victims: Vec<Position> = self
            .topology
            .positions()
            .filter(|&p| board.cell(p) == Some(other))
            .collect();

        let free: Vec<Position> = victims
            .iter()
            .copied()
            .filter(|&p| self.may_take_from_mills_always || !self.is_in_mill(board, p))
            .collect();
        // pieces in mills are fair game once nothing else is left
        let candidates = if free.is_empty() { victims } else { free };

        for take in candidates {
            let extended = mv.clone().with_take(take);
            if n == 1 {
                out.push(extended);
            } else {
                let mut scratch = board.clone();
                scratch.clear_cell_unhashed(take);
                self.push_takes(out, extended, &scratch, n - 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{HashSeeds, Player};
    use crate::rules::RulePreset;

    fn seeds() -> Arc<HashSeeds> {
        Arc::new(HashSeeds::default())
    }

    #[test]
    fn test_start_position_set_moves() {
        let rules = RuleSet::preset(RulePreset::Standard);
        let board = rules.start_board(seeds());
        let mut moves = Vec::new();
        rules.generate_moves(&board, &mut moves);
        // One set move per empty cell
        assert_eq!(moves.len(), 24);
        assert!(moves.iter().all(|m| m.is_set() && m.takes().is_empty()));
    }

    #[test]
    fn test_closing_mill_adds_take() {
        let rules = RuleSet::preset(RulePreset::Standard);
        let board = Board::from_cells(
            seeds(),
            &[(0, Player::White), (1, Player::White), (21, Player::Black)],
            [7, 8],
            Player::White,
        );
        let mut moves = Vec::new();
        rules.generate_moves(&board, &mut moves);
        let closing: Vec<&Move> = moves.iter().filter(|m| m.to() == 2).collect();
        assert_eq!(closing.len(), 1);
        assert_eq!(closing[0].takes(), &[21]);
    }

    #[test]
    fn test_sliding_piece_does_not_close_its_own_mill() {
        let rules = RuleSet::preset(RulePreset::Standard);
        // white 1 slides to 2 next to 0: the mill 0-1-2 is not closed by it
        let board = Board::from_cells(
            seeds(),
            &[
                (0, Player::White),
                (1, Player::White),
                (9, Player::White),
                (4, Player::Black),
                (14, Player::Black),
                (22, Player::Black),
            ],
            [0, 0],
            Player::White,
        );
        let mut moves = Vec::new();
        rules.generate_moves(&board, &mut moves);
        assert!(moves.contains(&Move::slide(1, 2)));
    }
}
