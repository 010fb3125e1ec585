//! Pawns.
//!
//! Pawns move and capture in different directions, depend on their side for
//! "forward", may advance two squares from their starting rank, promote on
//! the last rank and capture en passant right after an enemy double step.

use crate::engine::board::Board;
use crate::engine::ply::Ply;
use crate::engine::state::GameState;
use crate::engine::strategy::PlyStrategy;
use crate::engine::types::{Piece, Side, Square};

pub struct PawnStrategy;

/// The two squares a pawn of `side` on `from` captures on.
fn capture_squares(from: Square, side: Side) -> [Option<Square>; 2] {
    let forward = side.forward();
    [from.offset(-1, forward), from.offset(1, forward)]
}

/// Push a plain move or, on the last rank, a pending promotion.
fn push_advance(
    side: Side,
    from: Square,
    to: Square,
    captured: Option<Piece>,
    out: &mut Vec<Ply>,
) {
    if to.rank() == side.promotion_rank() {
        out.push(Ply::promotion(side, from, to, captured));
    } else {
        out.push(Ply::standard(side, Piece::Pawn, from, to, captured));
    }
}

impl PlyStrategy for PawnStrategy {
    fn piece(&self) -> Piece {
        Piece::Pawn
    }

    fn push_simple_plies(&self, from: Square, board: &Board, side: Side, out: &mut Vec<Ply>) {
        debug_assert_ne!(from.rank(), side.promotion_rank());
        let forward = side.forward();

        if let Some(one) = from.offset(0, forward)
            && board.is_empty(one)
        {
            push_advance(side, from, one, None, out);
            if from.rank() == side.pawn_start_rank()
                && let Some(two) = one.offset(0, forward)
                && board.is_empty(two)
            {
                out.push(Ply::standard(side, Piece::Pawn, from, two, None));
            }
        }

        for to in capture_squares(from, side).into_iter().flatten() {
            if let Some((owner, captured)) = board.at(to)
                && owner != side
            {
                push_advance(side, from, to, Some(captured), out);
            }
        }
    }

    /// En passant: only straight after the opponent's double step lands
    /// beside this pawn.
    fn push_special_plies(
        &self,
        from: Square,
        board: &Board,
        state: &GameState,
        out: &mut Vec<Ply>,
    ) {
        let side = state.turn();
        if from.rank() != side.en_passant_rank() {
            return;
        }
        let Some(last) = state.last_ply() else {
            return;
        };
        if last.turn() != side.other()
            || !last.is_double_pawn_push()
            || last.to().rank() != from.rank()
        {
            return;
        }
        for to in capture_squares(from, side).into_iter().flatten() {
            if to.file() == last.to().file() && board.is_empty(to) {
                out.push(Ply::en_passant(side, from, to));
            }
        }
    }

    fn can_attack(&self, from: Square, to: Square, board: &Board, side: Side) -> bool {
        debug_assert!(board.has_piece_side(Piece::Pawn, side, from));
        capture_squares(from, side).contains(&Some(to))
    }
}
