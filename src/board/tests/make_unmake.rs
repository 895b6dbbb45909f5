//! Make/unmake move tests.

use crate::board::{Board, Color, Move, Piece, Square, UnmakeInfo};
use rand::prelude::*;

fn find_move(board: &mut Board, from: Square, to: Square, promotion: Option<Piece>) -> Move {
    for m in board.generate_moves().iter() {
        if m.from() == from && m.to() == to && m.promotion() == promotion {
            return *m;
        }
    }
    panic!("Expected move not found");
}

#[test]
fn test_en_passant_make_unmake() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let original_hash = board.hash();
    let original_ep = board.en_passant_target;
    let mv = find_move(&mut board, Square::new(4, 4), Square::new(5, 5), None);
    let info = board.make_move(mv);
    board.unmake_move(mv, info);
    assert_eq!(board.hash(), original_hash);
    assert_eq!(board.en_passant_target, original_ep);
}

#[test]
fn test_promotion_make_unmake() {
    let mut board = Board::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1");
    let original_hash = board.hash();
    let mv = find_move(
        &mut board,
        Square::new(6, 0),
        Square::new(7, 0),
        Some(Piece::Queen),
    );
    let info = board.make_move(mv);
    board.unmake_move(mv, info);
    assert_eq!(board.hash(), original_hash);
    assert_eq!(
        board.piece_at(Square::new(6, 0)),
        Some((Color::White, Piece::Pawn))
    );
}

#[test]
fn test_null_move_make_unmake_restores_hash_and_ep() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let original_hash = board.hash();
    let original_ep = board.en_passant_target;
    let original_side = board.white_to_move;

    let info = board.make_null_move();
    assert_eq!(board.en_passant_target, None);
    assert_ne!(board.hash(), original_hash);
    assert_ne!(board.white_to_move, original_side);

    board.unmake_null_move(info);
    assert_eq!(board.hash(), original_hash);
    assert_eq!(board.en_passant_target, original_ep);
    assert_eq!(board.white_to_move, original_side);
}

#[test]
fn test_fullmove_number_round_trip() {
    let mut board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    assert_eq!(board.fullmove_number(), 1);

    // White's move does not advance the fullmove counter.
    let white_mv = find_move(&mut board, Square::new(1, 4), Square::new(3, 4), None);
    let white_info = board.make_move(white_mv);
    assert_eq!(board.fullmove_number(), 1);

    // Black's move advances it to 2.
    let black_mv = find_move(&mut board, Square::new(6, 4), Square::new(4, 4), None);
    let black_info = board.make_move(black_mv);
    assert_eq!(board.fullmove_number(), 2);

    // Unmaking restores it exactly, bit for bit.
    board.unmake_move(black_mv, black_info);
    assert_eq!(board.fullmove_number(), 1);
    board.unmake_move(white_mv, white_info);
    assert_eq!(board.fullmove_number(), 1);
}

#[test]
fn test_fullmove_number_fen_round_trip() {
    let board = Board::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
    assert_eq!(board.fullmove_number(), 2);
    let fen = board.to_fen();
    assert!(fen.ends_with(" 2"), "to_fen should emit the real fullmove number, got: {fen}");
}

#[test]
fn test_null_move_preserves_castling_rights() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let original_castling = board.castling_rights;
    let info = board.make_null_move();
    assert_eq!(board.castling_rights, original_castling);
    board.unmake_null_move(info);
    assert_eq!(board.castling_rights, original_castling);
}

#[test]
fn test_legal_moves_stable_after_make_unmake() {
    let mut board = Board::new();
    let initial_moves = board.generate_moves();
    let mut initial_list: Vec<String> = initial_moves.iter().map(|m| m.to_string()).collect();
    initial_list.sort();

    for mv in initial_moves.iter() {
        let info = board.make_move(*mv);
        board.unmake_move(*mv, info);
    }

    let after_moves = board.generate_moves();
    let mut after_list: Vec<String> = after_moves.iter().map(|m| m.to_string()).collect();
    after_list.sort();

    assert_eq!(initial_list, after_list);
}

#[test]
fn test_hash_matches_recompute_after_random_moves() {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut history: Vec<(Move, UnmakeInfo)> = Vec::new();

    for _ in 0..50 {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let idx = rng.gen_range(0..moves.len());
        let mv = moves.as_slice()[idx];
        let info = board.make_move(mv);
        history.push((mv, info));

        let recomputed = board.calculate_initial_hash();
        assert_eq!(board.hash(), recomputed);
    }

    while let Some((mv, info)) = history.pop() {
        board.unmake_move(mv, info);
        let recomputed = board.calculate_initial_hash();
        assert_eq!(board.hash(), recomputed);
    }
}

#[test]
fn test_random_playout_round_trip_state() {
    let mut board = Board::new();
    let initial_hash = board.hash();
    let initial_halfmove = board.halfmove_clock();
    let initial_castling = board.castling_rights;
    let initial_ep = board.en_passant_target;
    let initial_rep = board.repetition_counts.get(initial_hash);

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut history: Vec<(Move, UnmakeInfo)> = Vec::new();

    for _ in 0..200 {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let idx = rng.gen_range(0..moves.len());
        let mv = moves.as_slice()[idx];
        let info = board.make_move(mv);
        history.push((mv, info));
        let recomputed = board.calculate_initial_hash();
        assert_eq!(board.hash(), recomputed);
    }

    while let Some((mv, info)) = history.pop() {
        board.unmake_move(mv, info);
    }

    assert_eq!(board.hash(), initial_hash);
    assert_eq!(board.halfmove_clock(), initial_halfmove);
    assert_eq!(board.castling_rights, initial_castling);
    assert_eq!(board.en_passant_target, initial_ep);
    assert_eq!(board.repetition_counts.get(initial_hash), initial_rep);
}
