//! Bishops, rooks and queens.

use crate::engine::board::Board;
use crate::engine::ply::Ply;
use crate::engine::strategy::{PlyStrategy, push_slide, slide_reaches};
use crate::engine::types::{Direction, Piece, Side, Square};

/// A piece that moves any distance along a fixed set of directions.
pub struct SlidingStrategy {
    piece: Piece,
    directions: &'static [Direction],
}

impl SlidingStrategy {
    pub const fn new(piece: Piece, directions: &'static [Direction]) -> Self {
        SlidingStrategy { piece, directions }
    }
}

impl PlyStrategy for SlidingStrategy {
    fn piece(&self) -> Piece {
        self.piece
    }

    fn push_simple_plies(&self, from: Square, board: &Board, side: Side, out: &mut Vec<Ply>) {
        for &direction in self.directions {
            push_slide(self.piece, from, direction, board, side, out);
        }
    }

    fn can_attack(&self, from: Square, to: Square, board: &Board, side: Side) -> bool {
        debug_assert!(board.has_piece_side(self.piece, side, from));
        debug_assert_ne!(from, to);
        if board.has_side(side, to) {
            return false;
        }
        self.directions
            .iter()
            .any(|&direction| slide_reaches(from, to, direction, board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::for_piece;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn simple_plies(piece: Piece, from: &str, board: &Board) -> Vec<Ply> {
        let mut out = Vec::new();
        for_piece(piece).push_simple_plies(sq(from), board, Side::White, &mut out);
        out
    }

    fn lone(piece: Piece, at: &str) -> Board {
        let mut board = Board::empty();
        board.add(piece, Side::White, sq(at));
        board
    }

    #[test]
    fn open_board_counts() {
        assert_eq!(simple_plies(Piece::Rook, "d4", &lone(Piece::Rook, "d4")).len(), 14);
        assert_eq!(simple_plies(Piece::Bishop, "d4", &lone(Piece::Bishop, "d4")).len(), 13);
        assert_eq!(simple_plies(Piece::Queen, "d4", &lone(Piece::Queen, "d4")).len(), 27);
        assert_eq!(simple_plies(Piece::Bishop, "a1", &lone(Piece::Bishop, "a1")).len(), 7);
        assert_eq!(simple_plies(Piece::Queen, "h8", &lone(Piece::Queen, "h8")).len(), 21);
    }

    #[test]
    fn blocked_by_own_pieces_in_start_position() {
        let board = Board::standard();
        for (piece, from) in [
            (Piece::Rook, "a1"),
            (Piece::Bishop, "c1"),
            (Piece::Queen, "d1"),
        ] {
            assert!(simple_plies(piece, from, &board).is_empty(), "{piece}");
        }
    }

    #[test]
    fn captures_first_enemy_only() {
        let mut board = lone(Piece::Bishop, "c1");
        board.add(Piece::Knight, Side::Black, sq("e3"));
        board.add(Piece::Rook, Side::Black, sq("g5"));
        let plies = simple_plies(Piece::Bishop, "c1", &board);
        let targets: Vec<Square> = plies.iter().map(|p| p.to()).collect();
        assert!(targets.contains(&sq("e3")));
        assert!(!targets.contains(&sq("f4")));
        assert!(!targets.contains(&sq("g5")));
        let capture = plies.iter().find(|p| p.to() == sq("e3")).unwrap();
        assert_eq!(capture.captured_piece(), Some(Piece::Knight));
    }

    #[test]
    fn can_attack_along_open_lines() {
        let mut board = lone(Piece::Rook, "a1");
        board.add(Piece::King, Side::Black, sq("a8"));
        board.add(Piece::Pawn, Side::Black, sq("e1"));
        let rook = for_piece(Piece::Rook);
        assert!(rook.can_attack(sq("a1"), sq("a8"), &board, Side::White));
        assert!(rook.can_attack(sq("a1"), sq("e1"), &board, Side::White));
        assert!(rook.can_attack(sq("a1"), sq("c1"), &board, Side::White));
        assert!(!rook.can_attack(sq("a1"), sq("f1"), &board, Side::White));
        assert!(!rook.can_attack(sq("a1"), sq("b2"), &board, Side::White));
    }

    #[test]
    fn can_attack_is_blocked() {
        let mut board = lone(Piece::Queen, "d1");
        board.add(Piece::Pawn, Side::White, sq("d2"));
        board.add(Piece::King, Side::Black, sq("d8"));
        board.add(Piece::King, Side::White, sq("g4"));
        let queen = for_piece(Piece::Queen);
        assert!(!queen.can_attack(sq("d1"), sq("d8"), &board, Side::White));
        assert!(!queen.can_attack(sq("d1"), sq("h5"), &board, Side::White));
        assert!(queen.can_attack(sq("d1"), sq("f3"), &board, Side::White));
    }
}
