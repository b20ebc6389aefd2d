//! Error types shared by the library.
//!
//! The search itself has no recoverable errors; these cover parsing user input,
//! configuration and persistence.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum MillError {
    #[error("invalid move notation `{0}`")]
    Notation(String),

    #[error("unknown cell `{0}`")]
    UnknownCell(String),

    #[error("unknown board layout `{0}`")]
    UnknownLayout(String),

    #[error("unknown rule preset `{0}`")]
    UnknownPreset(String),

    #[error("illegal move `{0}`")]
    IllegalMove(String),

    #[error("game is already over")]
    GameOver,

    #[error("player did not deliver a move")]
    NoMoveFound,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MillError>;
