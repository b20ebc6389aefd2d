//! Searcher: iterative deepening driver, time budget, and search entry point.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::core::{Board, MAX_SEARCH_DEPTH, Move, Player, Variation};
use crate::engine::experience::SharedExperience;
use crate::engine::tt::SharedTable;
use crate::rules::RuleOracle;

use super::pv;
use super::types::{
    EVAL_INFTY, EVAL_WIN, SearchAborted, SearchConfig, SearchListener, SearchResult, SearchStats,
    plies_until_end,
};

/// The move the search would play right now
pub(super) struct Committed {
    pub(super) mv: Move,
    pub(super) value: f32,
    pub(super) variation: Variation,
}

pub struct Searcher {
    pub(super) rules: Arc<dyn RuleOracle>,
    pub(super) tt: SharedTable,
    pub(super) experience: Option<SharedExperience>,
    pub(super) config: SearchConfig,
    pub(super) stats: SearchStats,
    pub(super) stop: Arc<AtomicBool>,
    pub(super) start_time: Instant,
    pub(super) rng: StdRng,
    pub(super) root_player: Player,
    pub(super) depth: u32,
    pub(super) committed: Option<Committed>,
    listener: Option<Arc<dyn SearchListener>>,
    last_progress: f32,
}

impl Searcher {
    pub fn new(rules: Arc<dyn RuleOracle>, tt: SharedTable, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Searcher {
            rules,
            tt,
            experience: None,
            config,
            stats: SearchStats::default(),
            stop: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
            rng,
            root_player: Player::White,
            depth: 0,
            committed: None,
            listener: None,
            last_progress: 0.0,
        }
    }

    pub fn with_experience(mut self, experience: SharedExperience) -> Self {
        self.experience = Some(experience);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn SearchListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Use an externally owned stop flag
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Forget everything learned about positions
    pub fn clear(&mut self) {
        self.tt.lock().clear();
    }

    /// Search `root` and return the move to play.
    ///
    /// `None` means no move was ever committed: the position has no legal
    /// moves or is already lost for the player to move.
    pub fn search(&mut self, root: &Board) -> Option<SearchResult> {
        self.stop.store(false, Ordering::Relaxed);
        self.run(root)
    }

    /// Like [`Searcher::search`], but honors a stop requested before the start
    pub(crate) fn run(&mut self, root: &Board) -> Option<SearchResult> {
        self.start_time = Instant::now();
        self.stats = SearchStats::default();
        self.committed = None;
        self.root_player = root.current_player();
        self.last_progress = 0.0;

        let max_depth = self
            .config
            .limits
            .max_depth
            .clamp(1, MAX_SEARCH_DEPTH as u32 - 1);
        let mut completed = 0;

        for depth in 1..=max_depth {
            self.depth = depth;
            self.stats.nodes = 0;
            let mut variation = Variation::new();
            let mut board = root.clone();

            match self.negamax(
                &mut board,
                -EVAL_INFTY,
                EVAL_INFTY,
                0,
                depth as i32,
                &mut variation,
            ) {
                Ok(value) => {
                    completed = depth;
                    log::debug!(
                        "depth {} value {:.2} nodes {} time {}ms",
                        depth,
                        value * self.root_player.sign(),
                        self.stats.nodes,
                        self.start_time.elapsed().as_millis()
                    );
                    // the shortest forced game is known, deeper search cannot improve it
                    if value.abs() >= EVAL_WIN && plies_until_end(value) <= depth + 1 {
                        break;
                    }
                }
                Err(SearchAborted) => {
                    log::debug!("search stopped during depth {}", depth);
                    break;
                }
            }
        }

        let committed = self.committed.take()?;
        Some(SearchResult {
            best_move: committed.mv,
            value: committed.value,
            depth: completed,
            variation: committed.variation,
            stats: self.stats.clone(),
        })
    }

    #[inline]
    pub(super) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Raise the stop flag once the time budget is spent and report progress.
    pub(super) fn check_time(&mut self) {
        let elapsed = self.start_time.elapsed();
        let budget = self.config.limits.max_time;
        if elapsed >= budget {
            self.stop.store(true, Ordering::Relaxed);
        }

        if let Some(listener) = &self.listener {
            let fraction = if budget.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f32() / budget.as_secs_f32()).min(1.0)
            };
            if fraction - self.last_progress >= 0.01 || fraction >= 1.0 {
                self.last_progress = fraction;
                listener.on_progress(fraction);
            }
        }
    }

    /// Make `mv` the move delivered if the search stops now.
    pub(super) fn commit(&mut self, mv: Move, value: f32, variation: Variation) {
        let line = pv::thinking_line(
            self.rules.topology(),
            &variation,
            value,
            self.root_player,
            self.depth,
        );
        log::info!(target: "mill_engine::thinking", "{}", line);
        if let Some(listener) = &self.listener {
            listener.on_thinking(&line);
        }
        self.committed = Some(Committed {
            mv,
            value,
            variation,
        });
    }

    /// Principal variation read back from the table, starting at `board`
    pub(super) fn variation_from_table(&self, board: &Board) -> Variation {
        pv::variation_from_table(&self.tt, self.rules.as_ref(), board, self.depth as usize)
    }
}
