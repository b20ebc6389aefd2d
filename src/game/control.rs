//! Game control: drives the players, validates moves, and detects the end of
//! the game.

use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Board, HashSeeds, Move, Player};
use crate::engine::controller::EngineEvent;
use crate::error::{MillError, Result};
use crate::rules::{GameResult, RuleOracle};

use super::history::GameHistory;
use super::player::PlayerAgent;

/// Time a computer player may stay silent before the game gives up on it
const EVENT_TIMEOUT: Duration = Duration::from_secs(600);

pub struct GameControl {
    rules: Arc<dyn RuleOracle>,
    seeds: Arc<HashSeeds>,
    history: GameHistory,
    players: [PlayerAgent; 2],
    events: Receiver<EngineEvent>,
    request_id: u64,
    result: Option<GameResult>,
}

impl GameControl {
    pub fn new(
        rules: Arc<dyn RuleOracle>,
        seeds: Arc<HashSeeds>,
        white: PlayerAgent,
        black: PlayerAgent,
        events: Receiver<EngineEvent>,
    ) -> Self {
        let start = rules.start_board(seeds.clone());
        GameControl {
            rules,
            seeds,
            history: GameHistory::new(start),
            players: [white, black],
            events,
            request_id: 0,
            result: None,
        }
    }

    pub fn current_board(&self) -> &Board {
        self.history.current()
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Id of the position moves are currently expected for
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn player(&self, side: Player) -> &PlayerAgent {
        &self.players[side.index()]
    }

    fn player_to_move(&mut self) -> &mut PlayerAgent {
        let side = self.history.current().current_player();
        &mut self.players[side.index()]
    }

    /// Start a new game
    pub fn reset(&mut self) {
        for player in self.players.iter_mut() {
            player.cancel_move();
            player.reset_game();
        }
        self.history = GameHistory::new(self.rules.start_board(self.seeds.clone()));
        self.result = None;
        self.request_id += 1;
    }

    /// Ask the player to move for a move on the current position
    pub fn start_next_move(&mut self) {
        if self.result.is_some() {
            return;
        }
        let board = self.history.current().clone();
        let request_id = self.request_id;
        self.player_to_move().start_move(&board, request_id);
    }

    pub fn force_move(&mut self) {
        self.player_to_move().force_move();
    }

    /// Play `mv` for the player to move
    pub fn do_move(&mut self, mv: Move) -> Result<Option<GameResult>> {
        if self.result.is_some() {
            return Err(MillError::GameOver);
        }

        let mut legal = Vec::new();
        self.rules.generate_moves(self.history.current(), &mut legal);
        if !legal.contains(&mv) {
            return Err(MillError::IllegalMove(mv.notation(self.rules.topology())));
        }

        log::debug!(
            "ply {}: {} plays {}",
            self.history.ply() + 1,
            self.history.current().current_player(),
            mv.notation(self.rules.topology())
        );
        self.history.push(mv);
        self.request_id += 1;
        if let Some(result) = self.update_result() {
            self.notify_players(result);
        }
        Ok(self.result)
    }

    /// Take back the last move
    pub fn undo(&mut self) -> bool {
        self.player_to_move().cancel_move();
        let moved = self.history.undo();
        if moved {
            self.request_id += 1;
            self.result = None;
        }
        moved
    }

    /// Replay the next move of the history. A game ended this way was
    /// already reported to the players when it was first played.
    pub fn redo(&mut self) -> bool {
        self.player_to_move().cancel_move();
        let moved = self.history.redo();
        if moved {
            self.request_id += 1;
            self.update_result();
        }
        moved
    }

    /// Decide the game at the current position
    fn update_result(&mut self) -> Option<GameResult> {
        let board = self.history.current();
        let repeats = self.rules.tie_after_repeats() as usize;

        self.result = self.rules.outcome(board).or_else(|| {
            (repeats > 0 && self.history.repetitions() >= repeats).then_some(GameResult::Tie)
        });
        self.result
    }

    fn notify_players(&mut self, result: GameResult) {
        match result {
            GameResult::Winner(p) => log::info!("{} wins after {} plies", p, self.history.ply()),
            GameResult::Tie => log::info!("tie after {} plies", self.history.ply()),
        }
        let boards = self.history.played_boards();
        for player in self.players.iter_mut() {
            player.notify_winner(boards, result);
        }
    }

    /// Process one event from a player. Returns true when it played a move.
    pub fn handle_event(&mut self, event: EngineEvent) -> Result<bool> {
        if event.request_id() != self.request_id {
            if let EngineEvent::BestMove { request_id, .. } = &event {
                log::warn!(
                    "ignoring move for request {} (expecting {})",
                    request_id,
                    self.request_id
                );
            }
            return Ok(false);
        }

        match event {
            EngineEvent::BestMove { mv, .. } => {
                self.do_move(mv)?;
                Ok(true)
            }
            EngineEvent::NoMove { .. } => Err(MillError::NoMoveFound),
            EngineEvent::Progress { fraction, .. } => {
                log::trace!("progress {:.0}%", fraction * 100.0);
                Ok(false)
            }
            EngineEvent::Thinking { line, .. } => {
                log::trace!("{}", line);
                Ok(false)
            }
        }
    }

    /// Let computer players move until the game ends, a human is to move, or
    /// `max_plies` moves were played.
    pub fn play_to_end(&mut self, max_plies: usize) -> Result<Option<GameResult>> {
        while self.result.is_none() && self.history.ply() < max_plies {
            if !self.player_to_move().is_computer() {
                break;
            }
            self.start_next_move();
            loop {
                let event = self
                    .events
                    .recv_timeout(EVENT_TIMEOUT)
                    .map_err(|_| MillError::NoMoveFound)?;
                if self.handle_event(event)? {
                    break;
                }
            }
        }
        Ok(self.result)
    }
}
