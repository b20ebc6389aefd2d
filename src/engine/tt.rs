//! Transposition Table
//!
//! A hash table that stores previously searched positions to avoid
//! redundant work and improve move ordering across iterations.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::core::moves::Move;

/// Default table size in address bits
pub const DEFAULT_TABLE_BITS: u32 = 20;

/// Table that may be shared between two engines
pub type SharedTable = Arc<Mutex<TranspositionTable>>;

/// How a stored evaluation relates to the true value of the position
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum BoundType {
    /// Exact value
    Exact = 0,
    /// Lower bound (beta cutoff)
    Lower = 1,
    /// Upper bound (failed low)
    Upper = 2,
}

/// A single entry in the transposition table
#[derive(Clone, Debug)]
pub struct TTEntry {
    /// Zobrist hash (for verification); 0 marks an empty slot
    pub hash: u64,
    pub eval: f32,
    /// Remaining search depth the entry was computed with
    pub depth: i8,
    pub bound: BoundType,
    pub best_move: Option<Move>,
}

impl TTEntry {
    pub const EMPTY: TTEntry = TTEntry {
        hash: 0,
        eval: 0.0,
        depth: 0,
        bound: BoundType::Exact,
        best_move: None,
    };

    /// Whether the entry was searched at least `depth` plies deep
    #[inline]
    pub fn usable_at(&self, depth: i32) -> bool {
        self.depth as i32 >= depth
    }
}

/// Lookup and insert counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableStats {
    pub lookups: u64,
    pub hits: u64,
    /// Lookups that found another position in the slot
    pub collisions: u64,
    pub inserts: u64,
}

/// Transposition table
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    mask: usize,
    stats: TableStats,
}

impl TranspositionTable {
    /// Create a table with `2^n_bits` entries
    pub fn new(n_bits: u32) -> Self {
        let size = 1usize << n_bits;
        TranspositionTable {
            entries: vec![TTEntry::EMPTY; size],
            mask: size - 1,
            stats: TableStats::default(),
        }
    }

    /// Create a table wrapped for sharing between engines
    pub fn shared(n_bits: u32) -> SharedTable {
        Arc::new(Mutex::new(TranspositionTable::new(n_bits)))
    }

    /// Get the index for a hash key
    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Probe the table. Only an exact hash match is a hit.
    pub fn lookup(&mut self, hash: u64) -> Option<&TTEntry> {
        self.stats.lookups += 1;
        let idx = self.index(hash);
        let entry = &self.entries[idx];
        if entry.hash == hash && hash != 0 {
            self.stats.hits += 1;
            Some(entry)
        } else {
            if entry.hash != 0 {
                self.stats.collisions += 1;
            }
            None
        }
    }

    /// Store a search result.
    ///
    /// Empty slots and slots holding another position are overwritten; the same
    /// position is only overwritten by a search at least as deep.
    pub fn insert(
        &mut self,
        hash: u64,
        eval: f32,
        bound: BoundType,
        depth: i32,
        best_move: Option<Move>,
    ) {
        let idx = self.index(hash);
        let entry = &mut self.entries[idx];

        let should_replace = entry.hash != hash || depth >= entry.depth as i32;

        if should_replace {
            self.stats.inserts += 1;
            *entry = TTEntry {
                hash,
                eval,
                depth: depth as i8,
                bound,
                best_move,
            };
        }
    }

    /// Classify `eval` against the window it was searched with
    pub fn bound_type(eval: f32, alpha: f32, beta: f32) -> BoundType {
        if eval <= alpha {
            BoundType::Upper
        } else if eval >= beta {
            BoundType::Lower
        } else {
            BoundType::Exact
        }
    }

    /// Clear the table
    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.hash = 0;
        }
        self.stats = TableStats::default();
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    /// Get the fill rate in permille, sampled from the first slots
    pub fn fill_permille(&self) -> usize {
        let sample_size = 1000.min(self.entries.len());
        let used = self.entries[..sample_size]
            .iter()
            .filter(|e| e.hash != 0)
            .count();
        (used * 1000) / sample_size
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_type_classification() {
        assert_eq!(TranspositionTable::bound_type(-1.0, -1.0, 1.0), BoundType::Upper);
        assert_eq!(TranspositionTable::bound_type(1.0, -1.0, 1.0), BoundType::Lower);
        assert_eq!(TranspositionTable::bound_type(0.5, -1.0, 1.0), BoundType::Exact);
    }

    #[test]
    fn test_same_position_keeps_deeper_entry() {
        let mut tt = TranspositionTable::new(4);
        tt.insert(0x31, 1.0, BoundType::Exact, 5, None);
        tt.insert(0x31, 2.0, BoundType::Exact, 3, None);
        assert_eq!(tt.lookup(0x31).map(|e| e.eval), Some(1.0));
        tt.insert(0x31, 3.0, BoundType::Lower, 5, None);
        assert_eq!(tt.lookup(0x31).map(|e| e.eval), Some(3.0));
    }
}
