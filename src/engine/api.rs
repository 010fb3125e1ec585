//! Narrow views of the core types for notation codecs.
//!
//! Codecs read positions and plies only through these traits, never through
//! the board's internal index.

use crate::engine::board::Board;
use crate::engine::ply::Ply;
use crate::engine::types::{Piece, Side, Square};

/// Read access to piece placement.
pub trait BoardView {
    /// Visit every piece `side` has on the board.
    fn for_each_piece<F: FnMut(Piece, Square)>(&self, side: Side, f: F);

    /// The piece standing on `sq`, if any.
    fn piece_at(&self, sq: Square) -> Option<(Side, Piece)> {
        let mut found = None;
        for side in Side::ALL {
            self.for_each_piece(side, |piece, at| {
                if at == sq {
                    found = Some((side, piece));
                }
            });
        }
        found
    }
}

/// The minimum a codec needs to match a textual move against a ply.
pub trait PlyView {
    fn turn(&self) -> Side;
    fn piece(&self) -> Piece;
    fn from(&self) -> Square;
    fn to(&self) -> Square;
}

impl BoardView for Board {
    fn for_each_piece<F: FnMut(Piece, Square)>(&self, side: Side, f: F) {
        Board::for_each_piece(self, side, f);
    }

    fn piece_at(&self, sq: Square) -> Option<(Side, Piece)> {
        self.at(sq)
    }
}

impl PlyView for Ply {
    fn turn(&self) -> Side {
        Ply::turn(self)
    }

    fn piece(&self) -> Piece {
        Ply::piece(self)
    }

    fn from(&self) -> Square {
        Ply::from(self)
    }

    fn to(&self) -> Square {
        Ply::to(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    /// Walks the view generically so the trait methods, not the inherent
    /// ones, are exercised.
    fn count<B: BoardView>(board: &B, side: Side) -> usize {
        let mut n = 0;
        board.for_each_piece(side, |_, _| n += 1);
        n
    }

    fn describe<P: PlyView>(ply: &P) -> String {
        format!("{} {} {}{}", ply.turn(), ply.piece(), ply.from(), ply.to())
    }

    #[test]
    fn board_view() {
        let board = Board::standard();
        assert_eq!(count(&board, Side::White), 16);
        assert_eq!(count(&board, Side::Black), 16);
        assert_eq!(
            BoardView::piece_at(&board, sq("d8")),
            Some((Side::Black, Piece::Queen))
        );
        assert_eq!(BoardView::piece_at(&board, sq("d4")), None);
    }

    #[test]
    fn ply_view() {
        let ply = Ply::standard(Side::White, Piece::Knight, sq("g1"), sq("f3"), None);
        assert_eq!(describe(&ply), "white knight g1f3");
    }
}
