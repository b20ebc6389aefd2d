//! The kinds of players that can take part in a game.

use crossbeam_channel::Sender;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::sync::Arc;

use crate::core::Board;
use crate::engine::controller::{EngineEvent, SearchController};
use crate::rules::{GameResult, RuleOracle};

/// Plays a uniformly random legal move
pub struct RandomPlayer {
    rules: Arc<dyn RuleOracle>,
    events: Sender<EngineEvent>,
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(rules: Arc<dyn RuleOracle>, events: Sender<EngineEvent>) -> Self {
        Self::with_seed(rules, events, rand::random())
    }

    /// Same moves for the same seed and positions
    pub fn with_seed(rules: Arc<dyn RuleOracle>, events: Sender<EngineEvent>, seed: u64) -> Self {
        RandomPlayer {
            rules,
            events,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn start_move(&mut self, board: &Board, request_id: u64) {
        let mut moves = Vec::new();
        self.rules.generate_moves(board, &mut moves);
        let event = match moves.choose(&mut self.rng) {
            Some(mv) => EngineEvent::BestMove {
                request_id,
                mv: mv.clone(),
            },
            None => EngineEvent::NoMove { request_id },
        };
        let _ = self.events.send(event);
    }
}

/// A participant of the game
pub enum PlayerAgent {
    /// Moves arrive from outside through `GameControl::do_move`
    Human,
    Random(RandomPlayer),
    AlphaBeta(Box<SearchController>),
}

impl PlayerAgent {
    pub fn is_computer(&self) -> bool {
        !matches!(self, PlayerAgent::Human)
    }

    pub fn label(&self) -> &str {
        match self {
            PlayerAgent::Human => "human",
            PlayerAgent::Random(_) => "random",
            PlayerAgent::AlphaBeta(engine) => engine.name(),
        }
    }

    pub fn start_move(&mut self, board: &Board, request_id: u64) {
        match self {
            PlayerAgent::Human => {}
            PlayerAgent::Random(player) => player.start_move(board, request_id),
            PlayerAgent::AlphaBeta(engine) => engine.start_move(board, request_id),
        }
    }

    pub fn force_move(&mut self) {
        if let PlayerAgent::AlphaBeta(engine) = self {
            engine.force_move();
        }
    }

    pub fn cancel_move(&mut self) {
        if let PlayerAgent::AlphaBeta(engine) = self {
            engine.cancel_move();
        }
    }

    pub fn notify_winner(&mut self, boards: &[Board], result: GameResult) {
        if let PlayerAgent::AlphaBeta(engine) = self {
            engine.notify_winner(boards, result);
        }
    }

    pub fn reset_game(&mut self) {
        if let PlayerAgent::AlphaBeta(engine) = self {
            engine.reset_game();
        }
    }
}
