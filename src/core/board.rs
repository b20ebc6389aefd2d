//! Board representation
//!
//! A board is a fixed array of cells plus per-player piece bookkeeping and an
//! incrementally maintained Zobrist hash. The search reuses one board through
//! `apply_move`/`undo_move` pairs, so neither operation allocates.

use std::fmt;
use std::sync::Arc;

use super::moves::{Move, MoveAction};
use super::zobrist::HashSeeds;

/// Cell index on a board topology
pub type Position = u8;

/// Largest number of cells of any supported topology
pub const MAX_POSITIONS: usize = 36;

/// Largest number of pieces per player of any supported variant
pub const MAX_PIECES: usize = 15;

/// A side of the game. White moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    White,
    Black,
}

impl Player {
    #[inline]
    pub const fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }

    /// +1 for White, -1 for Black
    #[inline]
    pub const fn sign(self) -> f32 {
        match self {
            Player::White => 1.0,
            Player::Black => -1.0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Player::White => "white",
            Player::Black => "black",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Board state
#[derive(Clone)]
pub struct Board {
    cells: [Option<Player>; MAX_POSITIONS],
    current: Player,
    to_place: [u8; 2],
    on_board: [u8; 2],
    hash: u64,
    seeds: Arc<HashSeeds>,
}

impl Board {
    /// Empty board, both players holding `n_pieces`, White to move
    pub fn new(seeds: Arc<HashSeeds>, n_pieces: u8) -> Self {
        debug_assert!(n_pieces as usize <= MAX_PIECES);
        let mut board = Board {
            cells: [None; MAX_POSITIONS],
            current: Player::White,
            to_place: [n_pieces; 2],
            on_board: [0; 2],
            hash: 0,
            seeds,
        };
        board.hash = board.hash_from_scratch();
        board
    }

    /// Build an arbitrary position. Pieces on board are counted from `cells`.
    pub fn from_cells(
        seeds: Arc<HashSeeds>,
        cells: &[(Position, Player)],
        to_place: [u8; 2],
        current: Player,
    ) -> Self {
        let mut board = Board::new(seeds, 0);
        board.to_place = to_place;
        board.current = current;
        for &(pos, player) in cells {
            debug_assert!(board.cells[pos as usize].is_none(), "cell {pos} occupied twice");
            board.cells[pos as usize] = Some(player);
            board.on_board[player.index()] += 1;
        }
        board.hash = board.hash_from_scratch();
        board
    }

    #[inline]
    pub fn seeds(&self) -> &Arc<HashSeeds> {
        &self.seeds
    }

    #[inline]
    pub fn cell(&self, pos: Position) -> Option<Player> {
        self.cells[pos as usize]
    }

    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.cells[pos as usize].is_none()
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.current
    }

    #[inline]
    pub fn pieces_to_place(&self, player: Player) -> u8 {
        self.to_place[player.index()]
    }

    #[inline]
    pub fn pieces_on_board(&self, player: Player) -> u8 {
        self.on_board[player.index()]
    }

    /// Pieces on board plus pieces still to place
    #[inline]
    pub fn pieces_left(&self, player: Player) -> u8 {
        self.to_place[player.index()] + self.on_board[player.index()]
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Empty cells among the first `n_positions`
    pub fn n_empty(&self, n_positions: usize) -> usize {
        self.cells[..n_positions].iter().filter(|c| c.is_none()).count()
    }

    /// Recompute the hash from every fact of the position
    pub fn hash_from_scratch(&self) -> u64 {
        let mut hash = 0u64;
        for (pos, cell) in self.cells.iter().enumerate() {
            if let Some(player) = cell {
                hash ^= self.seeds.cell(*player, pos);
            }
        }
        for player in [Player::White, Player::Black] {
            hash ^= self.seeds.to_place(player, self.pieces_to_place(player));
        }
        if self.current == Player::Black {
            hash ^= self.seeds.black_to_move();
        }
        hash
    }

    /// Apply a legal move for the current player
    pub fn apply_move(&mut self, mv: &Move) {
        let me = self.current;
        let opp = me.opponent();

        match mv.action() {
            MoveAction::Set { to } => {
                debug_assert!(self.is_empty(to), "set onto occupied cell {to}");
                debug_assert!(self.pieces_to_place(me) > 0, "no pieces left to set");
                let left = self.to_place[me.index()];
                self.hash ^= self.seeds.to_place(me, left) ^ self.seeds.to_place(me, left - 1);
                self.to_place[me.index()] -= 1;
                self.on_board[me.index()] += 1;
                self.put(to, me);
            }
            MoveAction::Slide { from, to } => {
                debug_assert_eq!(self.cell(from), Some(me), "slide from foreign cell {from}");
                self.lift(from, me);
                self.put(to, me);
            }
        }

        for &take in mv.takes() {
            debug_assert_eq!(self.cell(take), Some(opp), "capture of foreign cell {take}");
            self.lift(take, opp);
            self.on_board[opp.index()] -= 1;
        }

        self.toggle_player();
    }

    /// Exact inverse of [`Board::apply_move`] for the same move
    pub fn undo_move(&mut self, mv: &Move) {
        self.toggle_player();
        let me = self.current;
        let opp = me.opponent();

        for &take in mv.takes().iter().rev() {
            self.put(take, opp);
            self.on_board[opp.index()] += 1;
        }

        match mv.action() {
            MoveAction::Set { to } => {
                self.lift(to, me);
                let left = self.to_place[me.index()];
                self.hash ^= self.seeds.to_place(me, left) ^ self.seeds.to_place(me, left + 1);
                self.to_place[me.index()] += 1;
                self.on_board[me.index()] -= 1;
            }
            MoveAction::Slide { from, to } => {
                self.lift(to, me);
                self.put(from, me);
            }
        }
    }

    /// Pass the turn without moving
    pub fn toggle_player(&mut self) {
        self.current = self.current.opponent();
        self.hash ^= self.seeds.black_to_move();
    }

    /// Remove a piece without touching counts or hash.
    ///
    /// Only used by the rule oracle to probe capture sequences on a scratch copy.
    pub(crate) fn clear_cell_unhashed(&mut self, pos: Position) {
        self.cells[pos as usize] = None;
    }

    #[inline]
    fn put(&mut self, pos: Position, player: Player) {
        self.cells[pos as usize] = Some(player);
        self.hash ^= self.seeds.cell(player, pos as usize);
    }

    #[inline]
    fn lift(&mut self, pos: Position, player: Player) {
        self.cells[pos as usize] = None;
        self.hash ^= self.seeds.cell(player, pos as usize);
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.current == other.current
            && self.to_place == other.to_place
            && self.on_board == other.on_board
            && self.cells == other.cells
    }
}

impl Eq for Board {}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({self}, hash {:016x})", self.hash)
    }
}

impl fmt::Display for Board {
    /// One character per cell (`W`, `B`, `.`) followed by the hands and side to move
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self
            .cells
            .iter()
            .rposition(|c| c.is_some())
            .map_or(0, |p| p + 1);
        for cell in &self.cells[..last] {
            let c = match cell {
                Some(Player::White) => 'W',
                Some(Player::Black) => 'B',
                None => '.',
            };
            write!(f, "{c}")?;
        }
        write!(
            f,
            " | white {}+{} black {}+{} | {} to move",
            self.on_board[0], self.to_place[0], self.on_board[1], self.to_place[1], self.current
        )
    }
}
