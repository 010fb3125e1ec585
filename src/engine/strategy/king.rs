//! Kings, including castling.

use crate::engine::board::Board;
use crate::engine::ply::Ply;
use crate::engine::state::GameState;
use crate::engine::strategy::{PlyStrategy, push_steps, step_reaches};
use crate::engine::types::{CheckCount, Piece, Side, Square};

const STEPS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, 1),
    (0, -1),
    (-1, 1),
    (1, 1),
    (-1, -1),
    (1, -1),
];

pub struct KingStrategy;

impl PlyStrategy for KingStrategy {
    fn piece(&self) -> Piece {
        Piece::King
    }

    fn can_move_in_check(&self, _check_count: CheckCount) -> bool {
        true
    }

    fn push_simple_plies(&self, from: Square, board: &Board, side: Side, out: &mut Vec<Ply>) {
        push_steps(Piece::King, from, &STEPS, board, side, out);
    }

    /// Castling candidates. Whether the king passes through or lands on an
    /// attacked square is checked later by the legality filter.
    fn push_special_plies(
        &self,
        _from: Square,
        board: &Board,
        state: &GameState,
        out: &mut Vec<Ply>,
    ) {
        if state.check_count() != CheckCount::None {
            return;
        }
        let side = state.turn();
        for castle in state.castling().castles(side) {
            let clear = board.has_piece_side(Piece::King, side, castle.king_from(side))
                && board.has_piece_side(Piece::Rook, side, castle.rook_from(side))
                && board.is_empty(castle.pass(side))
                && board.is_empty(castle.king_to(side))
                && castle.extra_pass(side).is_none_or(|sq| board.is_empty(sq));
            if clear {
                out.push(Ply::castle(side, castle));
            }
        }
    }

    fn can_attack(&self, from: Square, to: Square, board: &Board, side: Side) -> bool {
        debug_assert!(board.has_piece_side(Piece::King, side, from));
        !board.has_side(side, to) && step_reaches(from, to, &STEPS)
    }
}
