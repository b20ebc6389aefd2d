//! Game history as an arena of board snapshots.
//!
//! Snapshot `i` is the position after `i` moves. Undo and redo only move the
//! cursor; playing a new move drops the snapshots after the cursor.

use crate::core::{Board, Move};

#[derive(Clone, Debug)]
pub struct GameHistory {
    boards: Vec<Board>,
    moves: Vec<Move>,
    cursor: usize,
}

impl GameHistory {
    pub fn new(start: Board) -> Self {
        GameHistory {
            boards: vec![start],
            moves: Vec::new(),
            cursor: 0,
        }
    }

    /// Position at the cursor
    pub fn current(&self) -> &Board {
        &self.boards[self.cursor]
    }

    /// Number of moves played up to the cursor
    pub fn ply(&self) -> usize {
        self.cursor
    }

    /// Play `mv` on the current position, discarding any redo line
    pub fn push(&mut self, mv: Move) {
        self.boards.truncate(self.cursor + 1);
        self.moves.truncate(self.cursor);

        let mut next = self.current().clone();
        next.apply_move(&mv);
        self.boards.push(next);
        self.moves.push(mv);
        self.cursor += 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.boards.len()
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Snapshots from the start position up to and including the current one
    pub fn played_boards(&self) -> &[Board] {
        &self.boards[..=self.cursor]
    }

    /// Moves leading to the current position
    pub fn moves(&self) -> &[Move] {
        &self.moves[..self.cursor]
    }

    /// How often the current position occurred before
    pub fn repetitions(&self) -> usize {
        let current = self.current();
        self.boards[..self.cursor]
            .iter()
            .filter(|b| *b == current)
            .count()
    }
}
