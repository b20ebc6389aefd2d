//! Property tests for incremental hashing and move undo.

use proptest::prelude::*;
use std::sync::Arc;

use mill_engine::core::{Board, HashSeeds, Move, Player};
use mill_engine::rules::{RuleOracle, RulePreset, RuleSet, perft};

fn preset_strategy() -> impl Strategy<Value = RulePreset> {
    prop::sample::select(RulePreset::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_hash_matches_scratch_along_random_games(
        preset in preset_strategy(),
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<u32>(), 0..120),
    ) {
        let rules = RuleSet::preset(preset);
        let mut board = rules.start_board(Arc::new(HashSeeds::new(seed)));
        let start = board.clone();

        let mut played: Vec<Move> = Vec::new();
        let mut moves = Vec::new();
        for choice in choices {
            if rules.outcome(&board).is_some() {
                break;
            }
            moves.clear();
            rules.generate_moves(&board, &mut moves);
            if moves.is_empty() {
                break;
            }
            let mv = moves[choice as usize % moves.len()].clone();
            board.apply_move(&mv);
            prop_assert_eq!(board.hash(), board.hash_from_scratch());
            played.push(mv);
        }

        for mv in played.iter().rev() {
            board.undo_move(mv);
            prop_assert_eq!(board.hash(), board.hash_from_scratch());
        }
        prop_assert_eq!(&board, &start);
        prop_assert_eq!(board.hash(), start.hash());
    }

    #[test]
    fn prop_canonical_id_is_symmetric(
        choices in prop::collection::vec(any::<u32>(), 0..30),
    ) {
        let rules = RuleSet::preset(RulePreset::Standard);
        let mut board = rules.start_board(Arc::new(HashSeeds::default()));
        let mut moves = Vec::new();
        for choice in choices {
            moves.clear();
            rules.generate_moves(&board, &mut moves);
            if moves.is_empty() || rules.outcome(&board).is_some() {
                break;
            }
            board.apply_move(&moves[choice as usize % moves.len()]);
        }

        let id = rules.canonical_id(&board);
        let topo = rules.topology();
        for perm in topo.symmetries() {
            let cells: Vec<_> = topo
                .positions()
                .filter_map(|p| board.cell(p).map(|c| (perm[p as usize], c)))
                .collect();
            let image = Board::from_cells(
                board.seeds().clone(),
                &cells,
                [board.pieces_to_place(Player::White), board.pieces_to_place(Player::Black)],
                board.current_player(),
            );
            prop_assert_eq!(rules.canonical_id(&image), id);
        }
    }

    #[test]
    fn prop_perft_leaves_board_unchanged(
        preset in preset_strategy(),
        depth in 1u32..3,
    ) {
        let rules = RuleSet::preset(preset);
        let mut board = rules.start_board(Arc::new(HashSeeds::default()));
        let before = board.clone();
        let nodes = perft(&rules, &mut board, depth);
        prop_assert!(nodes > 0);
        prop_assert_eq!(board, before);
    }
}
