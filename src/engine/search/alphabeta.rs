//! Negamax alpha-beta search with transposition cutoffs.

use crate::core::{Board, Move, Variation};
use crate::engine::eval::evaluate;
use crate::engine::tt::{BoundType, TranspositionTable};

use super::ordering;
use super::searcher::Searcher;
use super::types::{EVAL_INFTY, EVAL_WIN, SearchAborted, TIME_CHECK_DEPTH, add_ply, sub_ply};

impl Searcher {
    /// Fail-soft negamax.
    ///
    /// Returns the value of `board` for the player to move, or `SearchAborted`
    /// once a stop was requested and a root move is committed. `board` is
    /// restored before returning either way.
    pub(super) fn negamax(
        &mut self,
        board: &mut Board,
        mut alpha: f32,
        mut beta: f32,
        ply: usize,
        depth: i32,
        variation: &mut Variation,
    ) -> Result<f32, SearchAborted> {
        let at_root = ply == 0;

        if depth > TIME_CHECK_DEPTH || at_root {
            self.check_time();
        }
        if self.stop_requested() && self.committed.is_some() {
            return Err(SearchAborted);
        }
        self.stats.nodes += 1;
        self.stats.total_nodes += 1;

        if board.pieces_left(board.current_player()) < 3 {
            return Ok(-EVAL_INFTY);
        }

        let hash = board.hash();
        let old_alpha = alpha;

        let entry = if self.config.use_table {
            self.tt.lock().lookup(hash).cloned()
        } else {
            None
        };

        if let Some(entry) = &entry {
            self.stats.tt_hits += 1;
            if entry.usable_at(depth) {
                match entry.bound {
                    BoundType::Exact => {
                        self.stats.tt_cutoffs += 1;
                        if at_root {
                            self.commit_from_table(board, entry.best_move.clone(), entry.eval);
                        }
                        return Ok(entry.eval);
                    }
                    BoundType::Lower => alpha = alpha.max(entry.eval),
                    BoundType::Upper => beta = beta.min(entry.eval),
                }
                if alpha >= beta {
                    self.stats.tt_cutoffs += 1;
                    if at_root {
                        self.commit_from_table(board, entry.best_move.clone(), entry.eval);
                    }
                    return Ok(entry.eval);
                }
            }
        }

        if depth == 0 {
            return Ok(evaluate(board, self.rules.as_ref(), &self.config.weights));
        }

        let mut moves = Vec::with_capacity(64);
        self.rules.generate_moves(board, &mut moves);
        if moves.is_empty() {
            return Ok(-EVAL_INFTY);
        }

        let tt_move = entry.as_ref().and_then(|e| e.best_move.as_ref());
        let shuffle = if at_root && self.config.randomize_root {
            Some(&mut self.rng)
        } else {
            None
        };
        ordering::order_moves(&mut moves, tt_move, shuffle);

        let mut best_eval = -EVAL_INFTY;
        let mut best_move: Option<Move> = None;
        let mut child_variation = Variation::new();

        for mv in &moves {
            board.apply_move(mv);
            child_variation.clear();

            let child = self.negamax(
                board,
                -sub_ply(beta),
                -sub_ply(alpha),
                ply + 1,
                depth - 1,
                &mut child_variation,
            );
            let mut eval = match child {
                Ok(value) => add_ply(-value),
                Err(aborted) => {
                    board.undo_move(mv);
                    return Err(aborted);
                }
            };

            if at_root && eval.abs() < EVAL_WIN {
                eval += self.experience_offset(board);
            }

            board.undo_move(mv);

            if eval > best_eval {
                best_eval = eval;
                best_move = Some(mv.clone());

                variation.clear();
                variation.push(mv.clone());
                variation.extend_from(&child_variation);

                if at_root {
                    self.commit(mv.clone(), eval, variation.clone());
                }

                if best_eval >= beta {
                    break;
                }
            }

            if best_eval > alpha {
                alpha = best_eval;
            }
        }

        if self.config.use_table {
            let bound = TranspositionTable::bound_type(best_eval, old_alpha, beta);
            self.tt.lock().insert(hash, best_eval, bound, depth, best_move);
        }

        Ok(best_eval)
    }

    /// Experience bias of the position after a root move, for the root player
    fn experience_offset(&self, board: &Board) -> f32 {
        let Some(experience) = &self.experience else {
            return 0.0;
        };
        let weight = self.config.weights.experience;
        if weight == 0.0 {
            return 0.0;
        }
        let id = self.rules.canonical_id(board);
        experience.read().offset(id, self.root_player) * weight
    }

    fn commit_from_table(&mut self, board: &Board, mv: Option<Move>, eval: f32) {
        if let Some(mv) = mv {
            let variation = self.variation_from_table(board);
            self.commit(mv, eval, variation);
        }
    }
}
