//! Legal ply generation.
//!
//! Pipeline:
//!   1. Ask each of the mover's pieces for its pseudo-legal plies.
//!   2. Filter: execute the ply, verify the mover's king is not attacked, undo.
//!
//! Step 2 only ever asks `can_attack` of the opponent's strategies, so
//! checking legality never needs the opponent's legal plies.

use std::ops::Deref;

use crate::engine::board::Board;
use crate::engine::ply::{Ply, PlyKind};
use crate::engine::state::GameState;
use crate::engine::strategy;
use crate::engine::types::{CheckCount, Piece, Side, Square};

// =========================================================================
// Trial execution
// =========================================================================

/// A ply executed on a board for inspection. Dropping the trial undoes the
/// ply, so the board is restored on every exit path.
pub struct Trial<'a> {
    board: &'a mut Board,
    ply: Ply,
}

impl<'a> Trial<'a> {
    /// Execute `ply` on `board`. Pending promotions are tried as queens.
    pub fn new(board: &'a mut Board, ply: Ply) -> Self {
        let ply = if ply.is_pending_promotion() {
            ply.with_promotion(Piece::Queen)
        } else {
            ply
        };
        ply.execute(board);
        Trial { board, ply }
    }
}

impl Deref for Trial<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        self.ply.undo(self.board);
    }
}

// =========================================================================
// Public API
// =========================================================================

/// Pseudo-legal plies for the side to move in `state`.
pub fn pseudo_legal_plies(board: &Board, state: &GameState) -> Vec<Ply> {
    let mut plies = Vec::with_capacity(64);
    board.for_each_piece(state.turn(), |piece, from| {
        strategy::for_piece(piece).plies(from, board, state, &mut plies);
    });
    plies
}

/// Legal plies for the side to move in `state`. `board` is used as scratch
/// space and is left exactly as it was.
pub fn legal_plies(board: &mut Board, state: &GameState) -> Vec<Ply> {
    let mut plies = pseudo_legal_plies(board, state);
    plies.retain(|&ply| is_legal(board, ply));
    plies
}

/// Whether `ply` leaves its own king safe. For castling, the squares the
/// king passes over and lands on must all be safe.
pub fn is_legal(board: &mut Board, ply: Ply) -> bool {
    let side = ply.turn();
    let trial = Trial::new(board, ply);
    let Some(king) = trial.king_square(side) else {
        return true;
    };
    match ply.kind() {
        PlyKind::Castle(castle) => {
            let probes = [
                Some(castle.pass(side)),
                castle.extra_pass(side),
                Some(castle.king_to(side)),
            ];
            !probes
                .into_iter()
                .flatten()
                .any(|sq| is_attacked(&trial, sq, side.other()))
        }
        _ => !is_attacked(&trial, king, side.other()),
    }
}

/// Whether any of `by`'s pieces could capture on `target`.
pub fn is_attacked(board: &Board, target: Square, by: Side) -> bool {
    board.pieces(by).any(|(piece, from)| {
        from != target && strategy::for_piece(piece).can_attack(from, target, board, by)
    })
}

/// How many of `by`'s pieces attack `target`.
///
/// # Panics
///
/// If more than two pieces do; a king cannot be checked three times over.
pub fn check_count(board: &Board, target: Square, by: Side) -> CheckCount {
    (0..attacker_count(board, target, by)).fold(CheckCount::None, |count, _| count.increment())
}

/// Number of `by`'s pieces attacking `target`, without the two-checker cap.
pub fn attacker_count(board: &Board, target: Square, by: Side) -> usize {
    board
        .pieces(by)
        .filter(|&(piece, from)| {
            from != target && strategy::for_piece(piece).can_attack(from, target, board, by)
        })
        .count()
}

/// Whether `ply`, already executed on `board`, attacks the opponent's king.
pub fn gives_check(board: &Board, ply: &Ply) -> bool {
    board
        .king_square(ply.turn().other())
        .is_some_and(|king| is_attacked(board, king, ply.turn()))
}

// =========================================================================
// Tests
// =========================================================================
