//! Controller and Game Tests
//!
//! Background searches, request ids, learning from finished games, and the
//! game loop driving two players.

use crossbeam_channel::{Receiver, unbounded};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mill_engine::core::{Board, HashSeeds, Move, Player};
use mill_engine::engine::controller::{EngineEvent, SearchController};
use mill_engine::engine::eval::EvalWeights;
use mill_engine::engine::experience::ExperienceStore;
use mill_engine::engine::search::{SearchConfig, SearchLimits};
use mill_engine::engine::tt::{BoundType, TranspositionTable};
use mill_engine::error::MillError;
use mill_engine::game::{GameControl, GameHistory, PlayerAgent, RandomPlayer};
use mill_engine::rules::{GameResult, RuleOracle, RulePreset, RuleSet};

const WAIT: Duration = Duration::from_secs(30);

fn rules(preset: RulePreset) -> Arc<dyn RuleOracle> {
    Arc::new(RuleSet::preset(preset))
}

fn seeds() -> Arc<HashSeeds> {
    Arc::new(HashSeeds::default())
}

fn config(depth: u32, time: Duration) -> SearchConfig {
    SearchConfig {
        limits: SearchLimits {
            max_time: time,
            max_depth: depth,
        },
        seed: Some(3),
        ..SearchConfig::default()
    }
}

/// Wait for the answer of a search, skipping progress reports
fn wait_for_move(rx: &Receiver<EngineEvent>) -> EngineEvent {
    loop {
        let event = rx.recv_timeout(WAIT).expect("engine answered");
        if matches!(event, EngineEvent::BestMove { .. } | EngineEvent::NoMove { .. }) {
            return event;
        }
    }
}

// ============================================================================
// Search Controller Tests
// ============================================================================

#[test]
fn test_controller_delivers_move() {
    let rules = rules(RulePreset::Standard);
    let board = rules.start_board(seeds());
    let (tx, rx) = unbounded();
    let mut engine = SearchController::new(
        "computerA",
        rules.clone(),
        TranspositionTable::shared(16),
        config(2, Duration::from_secs(60)),
        tx,
    );

    engine.start_move(&board, 5);
    match wait_for_move(&rx) {
        EngineEvent::BestMove { request_id, mv } => {
            assert_eq!(request_id, 5);
            let mut legal = Vec::new();
            rules.generate_moves(&board, &mut legal);
            assert!(legal.contains(&mv));
        }
        other => panic!("unexpected event {other:?}"),
    }
    engine.join();
    assert!(!engine.is_searching());
}

#[test]
fn test_force_move_delivers_early() {
    let rules = rules(RulePreset::Morabaraba);
    let board = rules.start_board(seeds());
    let (tx, rx) = unbounded();
    let mut engine = SearchController::new(
        "computerA",
        rules,
        TranspositionTable::shared(18),
        config(40, Duration::from_secs(600)),
        tx,
    );

    engine.start_move(&board, 1);
    thread::sleep(Duration::from_millis(100));
    engine.force_move();

    assert!(matches!(
        wait_for_move(&rx),
        EngineEvent::BestMove { request_id: 1, .. }
    ));
}

#[test]
fn test_cancel_discards_result() {
    let rules = rules(RulePreset::Morabaraba);
    let board = rules.start_board(seeds());
    let (tx, rx) = unbounded();
    let mut engine = SearchController::new(
        "computerA",
        rules,
        TranspositionTable::shared(18),
        config(40, Duration::from_secs(600)),
        tx,
    );

    engine.start_move(&board, 1);
    thread::sleep(Duration::from_millis(50));
    engine.cancel_move();

    assert!(!engine.is_searching());
    assert!(
        rx.try_iter()
            .all(|e| !matches!(e, EngineEvent::BestMove { .. } | EngineEvent::NoMove { .. }))
    );
}

#[test]
fn test_controller_reports_lost_position() {
    let rules = rules(RulePreset::Standard);
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
    let (tx, rx) = unbounded();
    let mut engine = SearchController::new(
        "computerB",
        rules,
        TranspositionTable::shared(12),
        config(3, Duration::from_secs(60)),
        tx,
    );

    engine.start_move(&board, 8);
    assert_eq!(wait_for_move(&rx), EngineEvent::NoMove { request_id: 8 });
}

#[test]
fn test_thinking_events_carry_request_id() {
    let rules = rules(RulePreset::NineHoles);
    let board = rules.start_board(seeds());
    let (tx, rx) = unbounded();
    let mut engine = SearchController::new(
        "computerA",
        rules,
        TranspositionTable::shared(12),
        config(3, Duration::from_secs(60)),
        tx,
    );

    engine.start_move(&board, 12);
    engine.join();
    let events: Vec<EngineEvent> = rx.try_iter().collect();
    assert!(events.iter().any(|e| matches!(e, EngineEvent::Thinking { .. })));
    assert!(events.iter().all(|e| e.request_id() == 12));
}

#[test]
fn test_new_weights_clear_table() {
    let (tx, _rx) = unbounded();
    let mut engine = SearchController::new(
        "computerA",
        rules(RulePreset::Standard),
        TranspositionTable::shared(10),
        SearchConfig::default(),
        tx,
    );
    engine.table().lock().insert(99, 1.0, BoundType::Exact, 3, None);

    let mut same = SearchConfig::default();
    same.limits.max_depth = 4;
    engine.set_config(same);
    assert!(engine.table().lock().lookup(99).is_some());

    engine.set_config(SearchConfig {
        weights: EvalWeights {
            mills: 2.0,
            ..EvalWeights::default()
        },
        ..SearchConfig::default()
    });
    assert!(engine.table().lock().lookup(99).is_none());
}

#[test]
fn test_new_weights_wait_for_running_search() {
    let rules = rules(RulePreset::NineHoles);
    let board = rules.start_board(seeds());
    let (tx, _rx) = unbounded();
    let mut engine = SearchController::new(
        "computerA",
        rules,
        TranspositionTable::shared(12),
        config(6, Duration::from_secs(60)),
        tx,
    );

    engine.start_move(&board, 1);
    engine.set_config(SearchConfig {
        weights: EvalWeights {
            mills: 2.0,
            ..EvalWeights::default()
        },
        ..config(6, Duration::from_secs(60))
    });
    assert!(!engine.is_searching());
    engine.join();
    // nothing from the old weights reaches the cleared table
    assert!(engine.table().lock().lookup(board.hash()).is_none());
}

#[test]
fn test_notify_winner_learns_positions() {
    let rules = rules(RulePreset::Standard);
    let mut history = GameHistory::new(rules.start_board(seeds()));
    for mv in [Move::set(0), Move::set(5), Move::set(1)] {
        history.push(mv);
    }

    let experience = ExperienceStore::shared();
    let (tx, _rx) = unbounded();
    let engine = SearchController::new(
        "computerA",
        rules.clone(),
        TranspositionTable::shared(10),
        SearchConfig::default(),
        tx,
    )
    .with_experience(experience.clone());

    engine.notify_winner(history.played_boards(), GameResult::Tie);
    assert!(experience.read().is_empty());

    engine.notify_winner(history.played_boards(), GameResult::Winner(Player::Black));
    let store = experience.read();
    // the final position is not recorded
    assert_eq!(store.len(), 3);
    let start = &history.played_boards()[0];
    assert_eq!(store.offset(rules.canonical_id(start), Player::Black), 1.0);
    assert_eq!(store.offset(rules.canonical_id(history.current()), Player::Black), 0.0);
}

// ============================================================================
// History Tests
// ============================================================================

#[test]
fn test_history_undo_redo() {
    let mut history = GameHistory::new(Board::new(seeds(), 9));
    history.push(Move::set(0));
    history.push(Move::set(5));
    assert_eq!(history.ply(), 2);

    assert!(history.undo());
    assert_eq!(history.ply(), 1);
    assert!(history.can_redo());
    assert!(history.redo());
    assert_eq!(history.current().cell(5), Some(Player::Black));

    history.undo();
    history.push(Move::set(6));
    assert!(!history.can_redo());
    assert_eq!(history.moves(), &[Move::set(0), Move::set(6)]);
    assert!(history.current().is_empty(5));
}

#[test]
fn test_history_counts_repetitions() {
    let start = Board::from_cells(
        seeds(),
        &[
            (0, Player::White),
            (2, Player::White),
            (7, Player::White),
            (3, Player::Black),
            (5, Player::Black),
            (8, Player::Black),
        ],
        [0, 0],
        Player::White,
    );
    let mut history = GameHistory::new(start);
    let cycle = [
        Move::slide(0, 1),
        Move::slide(3, 4),
        Move::slide(1, 0),
        Move::slide(4, 3),
    ];

    assert_eq!(history.repetitions(), 0);
    for mv in &cycle {
        history.push(mv.clone());
    }
    assert_eq!(history.repetitions(), 1);
    for mv in &cycle {
        history.push(mv.clone());
    }
    assert_eq!(history.repetitions(), 2);
}

// ============================================================================
// Game Control Tests
// ============================================================================

fn human_game(preset: RulePreset) -> GameControl {
    let (_tx, rx) = unbounded();
    GameControl::new(rules(preset), seeds(), PlayerAgent::Human, PlayerAgent::Human, rx)
}

#[test]
fn test_game_rejects_illegal_move() {
    let mut game = human_game(RulePreset::Standard);
    game.do_move(Move::set(0)).unwrap();
    assert!(matches!(
        game.do_move(Move::set(0)),
        Err(MillError::IllegalMove(_))
    ));
    assert_eq!(game.history().ply(), 1);
}

#[test]
fn test_game_ignores_stale_moves() {
    let mut game = human_game(RulePreset::Standard);
    let stale = EngineEvent::BestMove {
        request_id: game.request_id() + 7,
        mv: Move::set(3),
    };
    assert!(!game.handle_event(stale).unwrap());
    assert_eq!(game.history().ply(), 0);

    let current = EngineEvent::BestMove {
        request_id: game.request_id(),
        mv: Move::set(3),
    };
    assert!(game.handle_event(current).unwrap());
    assert_eq!(game.current_board().cell(3), Some(Player::White));
}

#[test]
fn test_game_undo_invalidates_requests() {
    let mut game = human_game(RulePreset::Standard);
    game.do_move(Move::set(0)).unwrap();
    let id = game.request_id();
    assert!(game.undo());
    assert_ne!(game.request_id(), id);
    assert_eq!(game.history().ply(), 0);
    assert!(game.redo());
    assert_eq!(game.current_board().cell(0), Some(Player::White));
}

#[test]
fn test_game_detects_win() {
    let mut game = human_game(RulePreset::NineHoles);
    // White closes the top row and takes, leaving Black two pieces
    for mv in [Move::set(0), Move::set(3), Move::set(1), Move::set(4)] {
        assert_eq!(game.do_move(mv).unwrap(), None);
    }
    let result = game.do_move(Move::set(2).with_take(3)).unwrap();
    assert_eq!(result, Some(GameResult::Winner(Player::White)));
    assert!(matches!(game.do_move(Move::set(5)), Err(MillError::GameOver)));
}

#[test]
fn test_redo_does_not_learn_twice() {
    let rules = rules(RulePreset::NineHoles);
    let (tx, _rx) = unbounded();
    let experience = ExperienceStore::shared();
    let engine = SearchController::new(
        "computerA",
        rules.clone(),
        TranspositionTable::shared(10),
        config(2, Duration::from_secs(10)),
        tx,
    )
    .with_experience(experience.clone());
    let (_events_tx, events_rx) = unbounded();
    let mut game = GameControl::new(
        rules.clone(),
        seeds(),
        PlayerAgent::AlphaBeta(Box::new(engine)),
        PlayerAgent::Human,
        events_rx,
    );

    for mv in [Move::set(0), Move::set(3), Move::set(1), Move::set(4)] {
        game.do_move(mv).unwrap();
    }
    let winning = Move::set(2).with_take(3);
    assert_eq!(
        game.do_move(winning).unwrap(),
        Some(GameResult::Winner(Player::White))
    );
    let start_id = rules.canonical_id(&game.history().played_boards()[0]);
    assert_eq!(experience.read().offset(start_id, Player::White), 1.0);

    assert!(game.undo());
    assert_eq!(game.result(), None);
    assert!(game.redo());
    assert_eq!(game.result(), Some(GameResult::Winner(Player::White)));
    assert_eq!(experience.read().offset(start_id, Player::White), 1.0);
}

#[test]
fn test_seeded_random_player_is_reproducible() {
    let rules = rules(RulePreset::Standard);
    let board = rules.start_board(seeds());
    let mut legal = Vec::new();
    rules.generate_moves(&board, &mut legal);

    let mut picks = Vec::new();
    for _ in 0..2 {
        let (tx, rx) = unbounded();
        let mut player = RandomPlayer::with_seed(rules.clone(), tx, 42);
        player.start_move(&board, 3);
        match rx.try_recv().unwrap() {
            EngineEvent::BestMove { request_id, mv } => {
                assert_eq!(request_id, 3);
                assert!(legal.contains(&mv));
                picks.push(mv);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(picks[0], picks[1]);
}

#[test]
fn test_random_players_play_to_end() {
    let rules = rules(RulePreset::NineHoles);
    let (tx, rx) = unbounded();
    let white = PlayerAgent::Random(RandomPlayer::new(rules.clone(), tx.clone()));
    let black = PlayerAgent::Random(RandomPlayer::new(rules.clone(), tx));
    let mut game = GameControl::new(rules, seeds(), white, black, rx);

    let result = game.play_to_end(200).unwrap();
    assert!(result.is_some() || game.history().ply() == 200);
    assert_eq!(game.result(), result);
}

#[test]
fn test_engine_beats_random_player() {
    let rules = rules(RulePreset::NineHoles);
    let (tx, rx) = unbounded();
    let experience = ExperienceStore::shared();
    let engine = SearchController::new(
        "computerA",
        rules.clone(),
        TranspositionTable::shared(16),
        config(4, Duration::from_millis(500)),
        tx.clone(),
    )
    .with_experience(experience.clone());
    let white = PlayerAgent::AlphaBeta(Box::new(engine));
    let black = PlayerAgent::Random(RandomPlayer::new(rules.clone(), tx));
    let mut game = GameControl::new(rules, seeds(), white, black, rx);

    assert!(game.player(Player::White).is_computer());
    assert_eq!(game.player(Player::White).label(), "computerA");

    let result = game.play_to_end(100).unwrap();
    assert!(result.is_some() || game.history().ply() == 100);
    if let Some(GameResult::Winner(_)) = result {
        assert!(!experience.read().is_empty());
    }
}
