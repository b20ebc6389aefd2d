//! Search Tests
//!
//! Alpha-beta against a full-width reference, forced wins, and the iterative
//! deepening driver.

use std::sync::Arc;
use std::time::Duration;

use mill_engine::core::{Board, HashSeeds, Move, Player};
use mill_engine::engine::eval::{EvalWeights, evaluate};
use mill_engine::engine::experience::ExperienceStore;
use mill_engine::engine::search::{
    EVAL_INFTY, EVAL_WIN, SearchConfig, SearchLimits, Searcher, add_ply, format_score,
    plies_until_end, sub_ply,
};
use mill_engine::engine::tt::TranspositionTable;
use mill_engine::rules::{RuleOracle, RulePreset, RuleSet};

fn seeds() -> Arc<HashSeeds> {
    Arc::new(HashSeeds::default())
}

fn config(depth: u32) -> SearchConfig {
    SearchConfig {
        limits: SearchLimits {
            max_time: Duration::from_secs(120),
            max_depth: depth,
        },
        seed: Some(7),
        ..SearchConfig::default()
    }
}

fn searcher(preset: RulePreset, config: SearchConfig) -> Searcher {
    let rules: Arc<dyn RuleOracle> = Arc::new(RuleSet::preset(preset));
    Searcher::new(rules, TranspositionTable::shared(16), config)
}

/// Plain negamax without pruning, same move order and tie breaking
fn full_width(
    rules: &dyn RuleOracle,
    board: &mut Board,
    depth: u32,
    w: &EvalWeights,
) -> (f32, Option<Move>) {
    if board.pieces_left(board.current_player()) < 3 {
        return (-EVAL_INFTY, None);
    }
    if depth == 0 {
        return (evaluate(board, rules, w), None);
    }
    let mut moves = Vec::new();
    rules.generate_moves(board, &mut moves);
    if moves.is_empty() {
        return (-EVAL_INFTY, None);
    }

    let mut best = -EVAL_INFTY;
    let mut best_move = None;
    for mv in &moves {
        board.apply_move(mv);
        let (value, _) = full_width(rules, board, depth - 1, w);
        board.undo_move(mv);
        let value = add_ply(-value);
        if value > best {
            best = value;
            best_move = Some(mv.clone());
        }
    }
    (best, best_move)
}

// ============================================================================
// Score Helper Tests
// ============================================================================

#[test]
fn test_ply_adjustment() {
    assert_eq!(add_ply(EVAL_INFTY), EVAL_INFTY - 1.0);
    assert_eq!(add_ply(-EVAL_INFTY), -EVAL_INFTY + 1.0);
    assert_eq!(add_ply(3.5), 3.5);
    assert_eq!(sub_ply(add_ply(9500.0)), 9500.0);
    assert_eq!(plies_until_end(EVAL_INFTY - 3.0), 3);
}

#[test]
fn test_format_score() {
    assert_eq!(format_score(EVAL_INFTY - 1.0, Player::White), "white wins the next move");
    assert_eq!(format_score(EVAL_INFTY - 5.0, Player::Black), "black wins in 3 moves");
    assert_eq!(format_score(-(EVAL_INFTY - 2.0), Player::White), "black wins the next move");
    assert_eq!(format_score(1.25, Player::Black), "-1.25");
}

// ============================================================================
// Alpha-Beta Tests
// ============================================================================

#[test]
fn test_alphabeta_matches_full_width() {
    let rules = RuleSet::preset(RulePreset::Tapatan);
    let mut board = rules.start_board(seeds());
    for mv in [Move::set(4), Move::set(0)] {
        board.apply_move(&mv);
    }

    for depth in 1..=4 {
        let cfg = SearchConfig {
            randomize_root: false,
            use_table: false,
            ..config(depth)
        };
        let weights = cfg.weights;
        let result = searcher(RulePreset::Tapatan, cfg).search(&board).unwrap();
        let (value, best) = full_width(&rules, &mut board.clone(), depth, &weights);

        assert_eq!(result.value, value, "depth {depth}");
        if value.abs() < EVAL_WIN {
            assert_eq!(result.depth, depth);
            assert_eq!(Some(result.best_move), best, "depth {depth}");
        }
    }
}

#[test]
fn test_alphabeta_matches_full_width_standard() {
    let rules = RuleSet::preset(RulePreset::Standard);
    let mut board = rules.start_board(seeds());
    for mv in [Move::set(0), Move::set(4), Move::set(1), Move::set(7)] {
        board.apply_move(&mv);
    }

    let cfg = SearchConfig {
        randomize_root: false,
        use_table: false,
        ..config(3)
    };
    let weights = cfg.weights;
    let result = searcher(RulePreset::Standard, cfg).search(&board).unwrap();
    let (value, best) = full_width(&rules, &mut board.clone(), 3, &weights);
    assert_eq!(result.value, value);
    assert_eq!(Some(result.best_move), best);
}

#[test]
fn test_table_does_not_change_value() {
    let rules = RuleSet::preset(RulePreset::NineHoles);
    let mut board = rules.start_board(seeds());
    board.apply_move(&Move::set(4));

    let plain = SearchConfig {
        randomize_root: false,
        use_table: false,
        ..config(4)
    };
    let with_table = SearchConfig {
        use_table: true,
        ..plain.clone()
    };
    let a = searcher(RulePreset::NineHoles, plain).search(&board).unwrap();
    let b = searcher(RulePreset::NineHoles, with_table).search(&board).unwrap();
    assert_eq!(a.value, b.value);
}

// ============================================================================
// Search Scenario Tests
// ============================================================================

#[test]
fn test_mate_in_one() {
    let board = Board::from_cells(
        seeds(),
        &[
            (0, Player::White),
            (1, Player::White),
            (3, Player::Black),
            (4, Player::Black),
        ],
        [1, 1],
        Player::White,
    );
    let result = searcher(RulePreset::NineHoles, config(10))
        .search(&board)
        .unwrap();

    assert_eq!(result.value, EVAL_INFTY - 1.0);
    assert_eq!(result.depth, 1);
    assert_eq!(result.best_move.to(), 2);
    assert!(result.best_move.is_set());
    assert_eq!(result.best_move.takes().len(), 1);
}

#[test]
fn test_prefers_closing_mill() {
    let board = Board::from_cells(
        seeds(),
        &[
            (0, Player::White),
            (1, Player::White),
            (21, Player::Black),
            (22, Player::Black),
        ],
        [7, 7],
        Player::White,
    );
    let result = searcher(RulePreset::Standard, config(1))
        .search(&board)
        .unwrap();

    assert!(result.value > 1.0, "value {}", result.value);
    assert_eq!(result.best_move.to(), 2);
    assert_eq!(result.best_move.takes().len(), 1);
}

#[test]
fn test_start_position_all_moves_equal() {
    let rules = RuleSet::preset(RulePreset::Standard);
    let board = rules.start_board(seeds());
    let cfg = SearchConfig {
        weights: EvalWeights {
            freedom: 0.0,
            ..EvalWeights::default()
        },
        ..config(1)
    };
    let result = searcher(RulePreset::Standard, cfg).search(&board).unwrap();

    assert_eq!(result.value, 0.0);
    let mut legal = Vec::new();
    rules.generate_moves(&board, &mut legal);
    assert!(legal.contains(&result.best_move));
}

#[test]
fn test_lost_position_has_no_move() {
    let board = Board::from_cells(
        seeds(),
        &[
            (0, Player::White),
            (1, Player::White),
            (10, Player::Black),
            (11, Player::Black),
            (12, Player::Black),
        ],
        [0, 0],
        Player::White,
    );
    assert!(searcher(RulePreset::Standard, config(3)).search(&board).is_none());
}

#[test]
fn test_zero_time_still_delivers_move() {
    let rules = RuleSet::preset(RulePreset::Standard);
    let board = rules.start_board(seeds());
    let cfg = SearchConfig {
        limits: SearchLimits {
            max_time: Duration::ZERO,
            max_depth: 10,
        },
        ..SearchConfig::default()
    };
    let result = searcher(RulePreset::Standard, cfg).search(&board).unwrap();

    // interrupted during the first iteration, the first root move stands
    assert_eq!(result.depth, 0);
    let mut legal = Vec::new();
    rules.generate_moves(&board, &mut legal);
    assert!(legal.contains(&result.best_move));
}

#[test]
fn test_search_leaves_root_untouched() {
    let rules = RuleSet::preset(RulePreset::SixMen);
    let mut board = rules.start_board(seeds());
    board.apply_move(&Move::set(5));
    let before = board.clone();

    let mut s = searcher(RulePreset::SixMen, config(3));
    let result = s.search(&board).unwrap();
    assert_eq!(board, before);
    assert!(!result.variation.is_empty());
    assert_eq!(result.variation.first(), Some(&result.best_move));
    assert!(s.stats().total_nodes > 0);
}

#[test]
fn test_seeded_search_is_reproducible() {
    let rules = RuleSet::preset(RulePreset::Standard);
    let board = rules.start_board(seeds());
    let a = searcher(RulePreset::Standard, config(2)).search(&board).unwrap();
    let b = searcher(RulePreset::Standard, config(2)).search(&board).unwrap();
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.value, b.value);
}

#[test]
fn test_experience_steers_root_choice() {
    let rules: Arc<dyn RuleOracle> = Arc::new(RuleSet::preset(RulePreset::Standard));
    let board = rules.start_board(seeds());

    let id_after = |mv: &Move| {
        let mut next = board.clone();
        next.apply_move(mv);
        rules.canonical_id(&next)
    };
    let corner = id_after(&Move::set(0));

    // every opening except a corner preceded a loss for White
    let experience = ExperienceStore::shared();
    {
        let mut store = experience.write();
        let mut moves = Vec::new();
        rules.generate_moves(&board, &mut moves);
        for mv in &moves {
            let id = id_after(mv);
            if id == corner {
                continue;
            }
            for _ in 0..5 {
                store.add_board(id, Player::Black);
            }
        }
    }

    let cfg = SearchConfig {
        weights: EvalWeights {
            freedom: 0.0,
            ..EvalWeights::default()
        },
        ..config(1)
    };
    let result = Searcher::new(rules.clone(), TranspositionTable::shared(16), cfg)
        .with_experience(experience)
        .search(&board)
        .unwrap();

    assert_eq!(id_after(&result.best_move), corner);
    assert_eq!(result.value, 0.0);
}
