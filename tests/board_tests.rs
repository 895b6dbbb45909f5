//! Integration-level board tests exercising only the crate's public surface:
//! FEN loading, perft, draw detection, and the shared transposition table.

use chess_engine::board::Board;
use chess_engine::tt::{BoundType, TranspositionTable};
use chess_engine::uci::parse_position_command;

struct TestPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(usize, u64)],
}

const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "Initial Position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197281)],
    },
    TestPosition {
        name: "Kiwipete",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9467), (4, 422333)],
    },
];

#[test]
fn perft_positions() {
    for position in TEST_POSITIONS {
        let mut board = Board::from_fen(position.fen);
        for &(depth, expected) in position.depths {
            let nodes = board.perft(depth);
            assert_eq!(
                nodes, expected,
                "Perft failed for {} at depth {}",
                position.name, depth
            );
        }
    }
}

#[test]
fn draw_detection_fifty_move_rule() {
    let board = Board::from_fen("8/8/8/8/8/8/8/K6k w - - 99 1");
    assert!(!board.is_draw(), "halfmove clock of 99 is not yet a draw");

    let board = Board::from_fen("8/8/8/8/8/8/8/K6k w - - 100 1");
    assert!(board.is_draw(), "halfmove clock of 100 is a fifty-move draw");
}

#[test]
fn halfmove_clock_resets_after_pawn_push() {
    let mut board = Board::new();
    let parts = [
        "position", "fen", "8/8/8/8/8/8/4P3/K1k5", "w", "-", "-", "99", "1", "moves", "e2e4",
    ];
    parse_position_command(&mut board, &parts);
    assert_eq!(board.halfmove_clock(), 0, "a pawn push resets the halfmove clock");
}

#[test]
fn transposition_table_store_and_probe_roundtrip() {
    let tt = TranspositionTable::new(1);
    let hash = 0xdead_beefu64;

    tt.store(hash, 1, 100, BoundType::Exact, None, 0);
    let entry = tt.probe(hash).expect("entry missing after first store");
    assert_eq!(entry.depth(), 1);

    // Shallower, otherwise identical store must not overwrite the deeper entry.
    tt.store(hash, 0, 50, BoundType::Exact, None, 0);
    let entry = tt.probe(hash).expect("entry missing after shallower store");
    assert_eq!(entry.depth(), 1, "shallower qsearch store should be skipped");

    // A deeper store replaces it.
    tt.store(hash, 5, 200, BoundType::Exact, None, 0);
    let entry = tt.probe(hash).expect("entry missing after deeper store");
    assert_eq!(entry.depth(), 5);
    assert_eq!(entry.score(), 200);
}
