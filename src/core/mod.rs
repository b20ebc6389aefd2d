//! Core game types and representations
//!
//! This module contains the fundamental building blocks of the engine:
//! - Board state with incremental hashing
//! - Move encoding and notation
//! - Board topologies (adjacency, mills, symmetries)
//! - Zobrist hash seeds

pub mod board;
pub mod moves;
pub mod topology;
pub mod zobrist;

pub use board::{Board, MAX_PIECES, MAX_POSITIONS, Player, Position};
pub use moves::{MAX_SEARCH_DEPTH, MAX_TAKES, Move, MoveAction, Takes, Variation};
pub use topology::{BoardLayout, Topology};
pub use zobrist::HashSeeds;
