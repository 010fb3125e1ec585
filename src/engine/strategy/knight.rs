//! Knights.

use crate::engine::board::Board;
use crate::engine::ply::Ply;
use crate::engine::strategy::{PlyStrategy, push_steps, step_reaches};
use crate::engine::types::{Piece, Side, Square};

const JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub struct KnightStrategy;

impl PlyStrategy for KnightStrategy {
    fn piece(&self) -> Piece {
        Piece::Knight
    }

    fn push_simple_plies(&self, from: Square, board: &Board, side: Side, out: &mut Vec<Ply>) {
        push_steps(Piece::Knight, from, &JUMPS, board, side, out);
    }

    fn can_attack(&self, from: Square, to: Square, board: &Board, side: Side) -> bool {
        debug_assert!(board.has_piece_side(Piece::Knight, side, from));
        !board.has_side(side, to) && step_reaches(from, to, &JUMPS)
    }
}
