//! Move representation
//!
//! A move either sets a new piece onto an empty cell or slides (or flies) a
//! piece from one cell to another. When the move closes one or more mills it
//! also carries the opponent cells captured by it, in the order the rule
//! oracle generated them.

use smallvec::SmallVec;
use std::fmt;

use super::board::Position;
use super::topology::Topology;
use crate::error::MillError;

/// Maximum number of captures a single move can carry
pub const MAX_TAKES: usize = 3;

/// Maximum length of a principal variation
pub const MAX_SEARCH_DEPTH: usize = 50;

/// Captured cells of a move, in generation order
pub type Takes = SmallVec<[Position; MAX_TAKES]>;

/// What the moving player does with its own piece
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MoveAction {
    /// Place a piece from the hand onto `to`
    Set { to: Position },
    /// Move the piece on `from` to `to` (slide or fly)
    Slide { from: Position, to: Position },
}

/// A move of the mill family games.
///
/// Equality compares the action and the captures element by element, so two
/// moves with the same captures in a different order are distinct.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Move {
    action: MoveAction,
    takes: Takes,
}

impl Move {
    /// Create a set move
    #[inline]
    pub fn set(to: Position) -> Self {
        Move {
            action: MoveAction::Set { to },
            takes: Takes::new(),
        }
    }

    /// Create a slide move
    #[inline]
    pub fn slide(from: Position, to: Position) -> Self {
        Move {
            action: MoveAction::Slide { from, to },
            takes: Takes::new(),
        }
    }

    /// Builder form of [`Move::push_take`]
    pub fn with_take(mut self, pos: Position) -> Self {
        self.push_take(pos);
        self
    }

    pub fn push_take(&mut self, pos: Position) {
        debug_assert!(self.takes.len() < MAX_TAKES, "too many captures");
        self.takes.push(pos);
    }

    #[inline]
    pub fn action(&self) -> MoveAction {
        self.action
    }

    /// Get the destination cell
    #[inline]
    pub fn to(&self) -> Position {
        match self.action {
            MoveAction::Set { to } | MoveAction::Slide { to, .. } => to,
        }
    }

    /// Get the source cell of a slide
    #[inline]
    pub fn from(&self) -> Option<Position> {
        match self.action {
            MoveAction::Set { .. } => None,
            MoveAction::Slide { from, .. } => Some(from),
        }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self.action, MoveAction::Set { .. })
    }

    #[inline]
    pub fn takes(&self) -> &[Position] {
        &self.takes
    }

    /// Write the move in cell-name notation: `d2`, `a1-a4`, `a1-a4xb2`
    pub fn notation(&self, topology: &Topology) -> String {
        let mut text = String::new();
        if let Some(from) = self.from() {
            text.push_str(topology.name(from));
            text.push('-');
        }
        text.push_str(topology.name(self.to()));
        for &take in &self.takes {
            text.push('x');
            text.push_str(topology.name(take));
        }
        text
    }

    /// Parse cell-name notation written by [`Move::notation`]
    pub fn parse(text: &str, topology: &Topology) -> Result<Self, MillError> {
        let text = text.trim();
        let mut parts = text.split('x');
        let action = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MillError::Notation(text.to_string()))?;

        let cell = |name: &str| {
            topology
                .position_by_name(name)
                .ok_or_else(|| MillError::UnknownCell(name.to_string()))
        };

        let mut mv = match action.split_once('-') {
            Some((from, to)) => Move::slide(cell(from)?, cell(to)?),
            None => Move::set(cell(action)?),
        };
        for take in parts {
            if mv.takes.len() == MAX_TAKES {
                return Err(MillError::Notation(text.to_string()));
            }
            mv.push_take(cell(take)?);
        }
        Ok(mv)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            MoveAction::Set { to } => write!(f, "[{}", to)?,
            MoveAction::Slide { from, to } => write!(f, "[{}->{}", from, to)?,
        }
        if !self.takes.is_empty() {
            let takes: Vec<String> = self.takes.iter().map(|t| t.to_string()).collect();
            write!(f, " ({})", takes.join(","))?;
        }
        write!(f, "]")
    }
}

/// The best line found from a search node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Variation {
    moves: SmallVec<[Move; 8]>,
}

impl Variation {
    pub fn new() -> Self {
        Variation::default()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn push(&mut self, mv: Move) {
        if self.moves.len() < MAX_SEARCH_DEPTH {
            self.moves.push(mv);
        }
    }

    /// Append every move of `other`
    pub fn extend_from(&mut self, other: &Variation) {
        for mv in other.iter() {
            self.push(mv.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    pub fn first(&self) -> Option<&Move> {
        self.moves.first()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
