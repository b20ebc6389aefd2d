//! Rule variants and the position oracle built on them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::{Board, BoardLayout, Move, Player, Position, Topology};
use crate::error::MillError;

use super::{GameResult, RuleOracle};

/// Traditional games of the mill family
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulePreset {
    Standard,
    Lasker,
    Morabaraba,
    Moebius,
    Windmill,
    Sunmill,
    SixMen,
    SevenMen,
    Tapatan,
    NineHoles,
    Achi,
    SmallTriangle,
    Polygon3,
    Polygon5,
    Polygon6,
}

impl RulePreset {
    pub const ALL: [RulePreset; 15] = [
        RulePreset::Standard,
        RulePreset::Lasker,
        RulePreset::Morabaraba,
        RulePreset::Moebius,
        RulePreset::Windmill,
        RulePreset::Sunmill,
        RulePreset::SixMen,
        RulePreset::SevenMen,
        RulePreset::Tapatan,
        RulePreset::NineHoles,
        RulePreset::Achi,
        RulePreset::SmallTriangle,
        RulePreset::Polygon3,
        RulePreset::Polygon5,
        RulePreset::Polygon6,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            RulePreset::Standard => "standard",
            RulePreset::Lasker => "lasker",
            RulePreset::Morabaraba => "morabaraba",
            RulePreset::Moebius => "moebius",
            RulePreset::Windmill => "windmill",
            RulePreset::Sunmill => "sunmill",
            RulePreset::SixMen => "six-men",
            RulePreset::SevenMen => "seven-men",
            RulePreset::Tapatan => "tapatan",
            RulePreset::NineHoles => "nine-holes",
            RulePreset::Achi => "achi",
            RulePreset::SmallTriangle => "small-triangle",
            RulePreset::Polygon3 => "polygon3",
            RulePreset::Polygon5 => "polygon5",
            RulePreset::Polygon6 => "polygon6",
        }
    }
}

impl fmt::Display for RulePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RulePreset {
    type Err = MillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RulePreset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| MillError::UnknownPreset(s.to_string()))
    }
}

/// A concrete rule variant on a concrete board
#[derive(Clone, Debug)]
pub struct RuleSet {
    pub(super) topology: Arc<Topology>,
    /// Pieces may be moved while some are still in hand
    pub lasker: bool,
    /// A player with three pieces left may move to any empty cell
    pub may_jump: bool,
    /// Closing two mills at once captures two pieces
    pub may_take_multiple: bool,
    /// Pieces standing in a mill may always be captured
    pub may_take_from_mills_always: bool,
    pub tie_after_repeats: u32,
    pub n_pieces: u8,
}

impl RuleSet {
    /// Standard rules on `layout` with `n_pieces` per player
    pub fn new(layout: BoardLayout, n_pieces: u8) -> Self {
        RuleSet {
            topology: Arc::new(Topology::new(layout)),
            lasker: false,
            may_jump: true,
            may_take_multiple: false,
            may_take_from_mills_always: false,
            tie_after_repeats: 3,
            n_pieces,
        }
    }

    pub fn preset(preset: RulePreset) -> Self {
        use BoardLayout as L;
        let mut rules = match preset {
            RulePreset::Standard => RuleSet::new(L::Standard, 9),
            RulePreset::Lasker => RuleSet::new(L::Standard, 10),
            RulePreset::Morabaraba => RuleSet::new(L::Morabaraba, 12),
            RulePreset::Moebius => RuleSet::new(L::Moebius, 9),
            RulePreset::Windmill => RuleSet::new(L::Windmill, 12),
            RulePreset::Sunmill => RuleSet::new(L::Sunmill, 12),
            RulePreset::SixMen => RuleSet::new(L::SixMen, 6),
            RulePreset::SevenMen => RuleSet::new(L::SevenMen, 7),
            RulePreset::Tapatan => RuleSet::new(L::SmallSquareDiagonal, 3),
            RulePreset::NineHoles => RuleSet::new(L::SmallSquare, 3),
            RulePreset::Achi => RuleSet::new(L::SmallSquareDiagonal, 4),
            RulePreset::SmallTriangle => RuleSet::new(L::SmallTriangle, 3),
            RulePreset::Polygon3 => RuleSet::new(L::Polygon3, 7),
            RulePreset::Polygon5 => RuleSet::new(L::Polygon5, 11),
            RulePreset::Polygon6 => RuleSet::new(L::Polygon6, 12),
        };

        match preset {
            RulePreset::Lasker => {
                rules.lasker = true;
                rules.may_jump = false;
            }
            RulePreset::Windmill | RulePreset::Sunmill => rules.may_take_multiple = true,
            RulePreset::SixMen
            | RulePreset::SevenMen
            | RulePreset::Tapatan
            | RulePreset::Achi
            | RulePreset::SmallTriangle => rules.may_jump = false,
            _ => {}
        }
        rules
    }

    pub fn topology_arc(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Number of empty neighbors of `pos`
    pub fn freedom_at(&self, board: &Board, pos: Position) -> u32 {
        self.topology
            .neighbors(pos)
            .iter()
            .filter(|&&n| board.is_empty(n))
            .count() as u32
    }

    /// Whether the piece on `pos` is part of a closed mill
    pub fn is_in_mill(&self, board: &Board, pos: Position) -> bool {
        let Some(owner) = board.cell(pos) else {
            return false;
        };
        self.topology
            .mills_through(pos)
            .iter()
            .any(|pair| pair.iter().all(|&p| board.cell(p) == Some(owner)))
    }

    fn current_player_has_lost(&self, board: &Board) -> bool {
        let me = board.current_player();
        if board.pieces_left(me) <= 2 {
            return true;
        }

        let blocked = self
            .topology
            .positions()
            .filter(|&p| board.cell(p) == Some(me))
            .all(|p| self.freedom_at(board, p) == 0);
        if blocked
            && board.pieces_to_place(me) == 0
            && (board.pieces_on_board(me) > 3 || !self.may_jump)
        {
            return true;
        }

        board.pieces_to_place(me) > 0 && board.n_empty(self.topology.n_positions()) == 0
    }

    fn position_id(&self, board: &Board, perm: Option<&[Position]>) -> u64 {
        let n = self.topology.n_positions();
        let mut cells = [None; crate::core::MAX_POSITIONS];
        for p in 0..n {
            let target = perm.map_or(p, |perm| perm[p] as usize);
            cells[target] = board.cell(p as Position);
        }

        let mut id = board.pieces_to_place(Player::White) as u64;
        id = id
            .wrapping_mul(self.n_pieces as u64 + 1)
            .wrapping_add(board.pieces_to_place(Player::Black) as u64);
        for cell in &cells[..n] {
            let code = match cell {
                None => 0,
                Some(Player::White) => 1,
                Some(Player::Black) => 2,
            };
            id = id.wrapping_mul(3).wrapping_add(code);
        }
        id.wrapping_mul(2)
            .wrapping_add(board.current_player().index() as u64)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::preset(RulePreset::Standard)
    }
}

impl RuleOracle for RuleSet {
    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn n_pieces(&self) -> u8 {
        self.n_pieces
    }

    fn tie_after_repeats(&self) -> u32 {
        self.tie_after_repeats
    }

    fn may_fly(&self, board: &Board, player: Player) -> bool {
        self.may_jump && board.pieces_left(player) == 3
    }

    fn generate_moves(&self, board: &Board, out: &mut Vec<Move>) {
        self.generate(board, out);
    }

    fn outcome(&self, board: &Board) -> Option<GameResult> {
        let me = board.current_player();
        if board.pieces_left(me.opponent()) <= 2 {
            return Some(GameResult::Winner(me));
        }
        if self.current_player_has_lost(board) {
            return Some(GameResult::Winner(me.opponent()));
        }
        None
    }

    fn canonical_id(&self, board: &Board) -> u64 {
        self.topology
            .symmetries()
            .iter()
            .map(|perm| self.position_id(board, Some(perm)))
            .min()
            .unwrap_or_else(|| self.position_id(board, None))
    }
}
