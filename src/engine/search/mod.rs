//! Search: iterative deepening over a fail-soft negamax with alpha-beta
//! pruning, transposition cutoffs and mate-distance scoring.

mod alphabeta;
mod ordering;
mod pv;
mod searcher;
mod types;

pub use pv::format_score;
pub use searcher::Searcher;
pub use types::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_TIME_MS, EVAL_INFTY, EVAL_WIN, SearchAborted, SearchConfig,
    SearchLimits, SearchListener, SearchResult, SearchStats, TIME_CHECK_DEPTH, add_ply,
    plies_until_end, sub_ply,
};
