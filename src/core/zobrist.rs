//! Zobrist hashing for position identification
//!
//! Every hashable fact of a position (a piece on a cell, the number of pieces
//! a player still has to place, Black to move) owns an independent random key.
//! The position hash is the XOR of the keys of all facts that currently hold,
//! so applying a move only XORs out the facts that stopped holding and XORs in
//! the new ones.

use super::board::{MAX_PIECES, MAX_POSITIONS, Player};

/// Seed used by [`HashSeeds::default`].
pub const DEFAULT_HASH_SEED: u64 = 0x12345678_9ABCDEF0;

/// Random keys shared by all boards of one engine context.
///
/// Boards hold an `Arc<HashSeeds>`; two boards only hash compatibly when they
/// were created from the same seeds.
#[derive(Debug)]
pub struct HashSeeds {
    /// Keys for a piece of a player on a cell [player][cell]
    cells: [[u64; MAX_POSITIONS]; 2],
    /// Keys for the count of pieces still to place [player][count]
    to_place: [[u64; MAX_PIECES + 1]; 2],
    /// Key for Black to move
    black_to_move: u64,
    seed: u64,
}

impl HashSeeds {
    /// Generate a key set from `seed` using a PRNG
    pub fn new(seed: u64) -> Self {
        // xorshift64 never leaves the all-zero state
        let mut rng = SimpleRng::new(if seed == 0 { DEFAULT_HASH_SEED } else { seed });

        let mut cells = [[0u64; MAX_POSITIONS]; 2];
        for player_keys in cells.iter_mut() {
            for key in player_keys.iter_mut() {
                *key = rng.next();
            }
        }

        let mut to_place = [[0u64; MAX_PIECES + 1]; 2];
        for player_keys in to_place.iter_mut() {
            for key in player_keys.iter_mut() {
                *key = rng.next();
            }
        }

        let black_to_move = rng.next();

        HashSeeds {
            cells,
            to_place,
            black_to_move,
            seed,
        }
    }

    /// Seed the keys were generated from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the key for a piece of `player` on `cell`
    #[inline]
    pub fn cell(&self, player: Player, cell: usize) -> u64 {
        self.cells[player.index()][cell]
    }

    /// Get the key for `player` having `count` pieces left to place
    #[inline]
    pub fn to_place(&self, player: Player, count: u8) -> u64 {
        self.to_place[player.index()][count as usize]
    }

    /// Get the side to move key
    #[inline]
    pub fn black_to_move(&self) -> u64 {
        self.black_to_move
    }
}

impl Default for HashSeeds {
    fn default() -> Self {
        HashSeeds::new(DEFAULT_HASH_SEED)
    }
}

/// Simple PRNG for generating Zobrist keys
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next(&mut self) -> u64 {
        // xorshift64
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_are_deterministic() {
        let a = HashSeeds::new(42);
        let b = HashSeeds::new(42);
        assert_eq!(a.cell(Player::White, 5), b.cell(Player::White, 5));
        assert_eq!(a.black_to_move(), b.black_to_move());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = HashSeeds::new(1);
        let b = HashSeeds::new(2);
        assert_ne!(a.cell(Player::Black, 0), b.cell(Player::Black, 0));
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let seeds = HashSeeds::new(0);
        assert_ne!(seeds.black_to_move(), 0);
    }
}
