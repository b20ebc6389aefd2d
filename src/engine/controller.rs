//! Asynchronous search controller.
//!
//! Runs one search at a time on a background thread and reports through a
//! channel of [`EngineEvent`]s. Every event carries the request id the search
//! was started with; the receiver compares it against the position it is
//! currently waiting for and drops stale results.

use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::core::{Board, Move};
use crate::engine::experience::SharedExperience;
use crate::engine::search::{SearchConfig, SearchListener, Searcher};
use crate::engine::tt::SharedTable;
use crate::rules::{GameResult, RuleOracle};

/// Messages from a player to whoever drives the game
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Fraction of the thinking time used
    Progress { request_id: u64, fraction: f32 },
    /// Current best line, for display only
    Thinking { request_id: u64, line: String },
    /// The move chosen for the request
    BestMove { request_id: u64, mv: Move },
    /// The search could not commit any move
    NoMove { request_id: u64 },
}

impl EngineEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            EngineEvent::Progress { request_id, .. }
            | EngineEvent::Thinking { request_id, .. }
            | EngineEvent::BestMove { request_id, .. }
            | EngineEvent::NoMove { request_id } => *request_id,
        }
    }
}

struct ChannelListener {
    tx: Sender<EngineEvent>,
    request_id: u64,
}

impl SearchListener for ChannelListener {
    fn on_progress(&self, fraction: f32) {
        let _ = self.tx.send(EngineEvent::Progress {
            request_id: self.request_id,
            fraction,
        });
    }

    fn on_thinking(&self, line: &str) {
        let _ = self.tx.send(EngineEvent::Thinking {
            request_id: self.request_id,
            line: line.to_string(),
        });
    }
}

/// Alpha-beta engine playing one side of a game
pub struct SearchController {
    name: String,
    rules: Arc<dyn RuleOracle>,
    tt: SharedTable,
    experience: Option<SharedExperience>,
    config: SearchConfig,
    events: Sender<EngineEvent>,
    stop: Arc<AtomicBool>,
    discard: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(
        name: impl Into<String>,
        rules: Arc<dyn RuleOracle>,
        tt: SharedTable,
        config: SearchConfig,
        events: Sender<EngineEvent>,
    ) -> Self {
        SearchController {
            name: name.into(),
            rules,
            tt,
            experience: None,
            config,
            events,
            stop: Arc::new(AtomicBool::new(false)),
            discard: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn with_experience(mut self, experience: SharedExperience) -> Self {
        self.experience = Some(experience);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn table(&self) -> &SharedTable {
        &self.tt
    }

    /// Change the search configuration. New weights invalidate the table,
    /// so a running search is finished before it is cleared.
    pub fn set_config(&mut self, config: SearchConfig) {
        if config.weights != self.config.weights {
            self.join();
            self.tt.lock().clear();
        }
        self.config = config;
    }

    /// Switch to other rules; the table content belongs to the old ones.
    pub fn set_rules(&mut self, rules: Arc<dyn RuleOracle>) {
        self.cancel_move();
        self.rules = rules;
        self.tt.lock().clear();
    }

    /// Start searching `board` in the background.
    ///
    /// A still running previous search is waited for first.
    pub fn start_move(&mut self, board: &Board, request_id: u64) {
        self.join();

        self.stop = Arc::new(AtomicBool::new(false));
        self.discard = Arc::new(AtomicBool::new(false));

        let listener = Arc::new(ChannelListener {
            tx: self.events.clone(),
            request_id,
        });
        let mut searcher = Searcher::new(self.rules.clone(), self.tt.clone(), self.config.clone())
            .with_stop_flag(self.stop.clone())
            .with_listener(listener);
        if let Some(experience) = &self.experience {
            searcher = searcher.with_experience(experience.clone());
        }

        let board = board.clone();
        let discard = self.discard.clone();
        let tx = self.events.clone();
        let name = self.name.clone();
        let rules = self.rules.clone();

        log::debug!("{}: start search for request {}", name, request_id);
        self.worker = Some(thread::spawn(move || {
            let result = searcher.run(&board);
            if discard.load(Ordering::Acquire) {
                log::debug!("{}: discarding result of request {}", name, request_id);
                return;
            }
            match result {
                Some(result) => {
                    log::info!(
                        "{}: plays {} (depth {}, {} nodes)",
                        name,
                        result.best_move.notation(rules.topology()),
                        result.depth,
                        result.stats.total_nodes
                    );
                    let _ = tx.send(EngineEvent::BestMove {
                        request_id,
                        mv: result.best_move,
                    });
                }
                None => {
                    log::warn!("{}: no move found for request {}", name, request_id);
                    let _ = tx.send(EngineEvent::NoMove { request_id });
                }
            }
        }));
    }

    /// Stop thinking and deliver the best move found so far
    pub fn force_move(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Stop thinking, never deliver the result, and wait for the thread
    pub fn cancel_move(&mut self) {
        self.discard.store(true, Ordering::Release);
        self.stop.store(true, Ordering::Relaxed);
        self.join();
    }

    /// Wait until the running search, if any, has finished
    pub fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("{}: search thread panicked", self.name);
            }
        }
    }

    pub fn is_searching(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Learn from a finished game: every position before the final one is
    /// recorded with the winner. Ties teach nothing.
    pub fn notify_winner(&self, boards: &[Board], result: GameResult) {
        let (Some(winner), Some(experience)) = (result.winner(), &self.experience) else {
            return;
        };
        let Some((_, played)) = boards.split_last() else {
            return;
        };

        let mut experience = experience.write();
        for board in played {
            experience.add_board(self.rules.canonical_id(board), winner);
        }
        log::debug!(
            "{}: learned {} positions, {} known",
            self.name,
            played.len(),
            experience.len()
        );
    }

    /// Forget the table so a new game is not a replay of the last one
    pub fn reset_game(&mut self) {
        self.cancel_move();
        self.tt.lock().clear();
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_move();
    }
}
