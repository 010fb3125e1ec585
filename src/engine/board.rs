//! Mutable position store.
//!
//! `Board` keeps piece placement twice: a 64-entry grid answering "what is on
//! this square" and a per-side, per-piece index of square sets answering "where
//! are this side's pieces". Every mutating operation updates both before it
//! returns, so the two views always agree.

use std::fmt;

use crate::engine::types::{Bitboard, File, Piece, Rank, Side, Square};

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Piece placement with a side×piece square index.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
///
/// Equality is structural over grid and index; repetition detection relies
/// on it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    grid: [Option<(Side, Piece)>; Square::NUM],
    index: [[Bitboard; Piece::COUNT]; 2],
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Board {
            grid: [None; Square::NUM],
            index: [[Bitboard::EMPTY; Piece::COUNT]; 2],
        }
    }

    /// Standard starting position.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for side in Side::ALL {
            for (file, piece) in File::ALL.into_iter().zip(BACK_RANK) {
                board.add(piece, side, Square::new(file, side.home_rank()));
                board.add(Piece::Pawn, side, Square::new(file, side.pawn_start_rank()));
            }
        }
        board
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Place a piece on an empty square.
    ///
    /// # Panics
    ///
    /// If `sq` is already occupied.
    pub fn add(&mut self, piece: Piece, side: Side, sq: Square) {
        assert!(
            self.grid[sq.index()].is_none(),
            "cannot add {side} {piece} to occupied square {sq}"
        );
        self.grid[sq.index()] = Some((side, piece));
        self.index[side.index()][piece.index()].set(sq);
    }

    /// Clear a square, returning what stood there.
    pub fn remove(&mut self, sq: Square) -> Option<(Side, Piece)> {
        let taken = self.grid[sq.index()].take();
        if let Some((side, piece)) = taken {
            self.index[side.index()][piece.index()].clear(sq);
        }
        taken
    }

    /// Move `side`'s piece from `from` to `to`, returning the kind of any
    /// opponent piece captured on `to`.
    ///
    /// # Panics
    ///
    /// If `from` does not hold a piece of `side`, or `to` holds one.
    pub fn move_piece(&mut self, from: Square, to: Square, side: Side) -> Option<Piece> {
        let Some((owner, piece)) = self.grid[from.index()] else {
            panic!("no piece to move on {from}");
        };
        assert_eq!(owner, side, "piece on {from} belongs to {owner}, not {side}");
        assert!(
            !self.has_side(side, to),
            "cannot move {side} {piece} onto own piece at {to}"
        );

        let captured = self.remove(to).map(|(_, p)| p);
        self.remove(from);
        self.add(piece, side, to);
        captured
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn at(&self, sq: Square) -> Option<(Side, Piece)> {
        self.grid[sq.index()]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.grid[sq.index()].is_none()
    }

    /// Does `sq` hold any piece of `side`?
    #[inline]
    pub fn has_side(&self, side: Side, sq: Square) -> bool {
        matches!(self.grid[sq.index()], Some((s, _)) if s == side)
    }

    /// Does `sq` hold `side`'s `piece`?
    #[inline]
    pub fn has_piece_side(&self, piece: Piece, side: Side, sq: Square) -> bool {
        self.grid[sq.index()] == Some((side, piece))
    }

    /// Squares holding `side`'s pieces of kind `piece`.
    #[inline]
    pub fn squares(&self, side: Side, piece: Piece) -> Bitboard {
        self.index[side.index()][piece.index()]
    }

    /// Visit each of `side`'s pieces, walking the index rather than the grid.
    pub fn for_each_piece(&self, side: Side, mut f: impl FnMut(Piece, Square)) {
        for piece in Piece::ALL {
            for sq in self.squares(side, piece).iter() {
                f(piece, sq);
            }
        }
    }

    /// `side`'s pieces as `(piece, square)` pairs, pawns first.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Piece, Square)> + '_ {
        Piece::ALL
            .into_iter()
            .flat_map(move |piece| self.squares(side, piece).iter().map(move |sq| (piece, sq)))
    }

    /// Where `side`'s king stands. Custom positions may have none.
    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.squares(side, Piece::King).lsb()
    }

    /// Total number of pieces on the board.
    pub fn piece_count(&self) -> u32 {
        self.index.iter().flatten().map(|bb| bb.pop_count()).sum()
    }

    // -----------------------------------------------------------------------
    // Consistency check (debug builds)
    // -----------------------------------------------------------------------

    /// Verify that the index agrees with the grid.
    /// Available in debug builds and test builds.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for sq in Square::all() {
            for side in Side::ALL {
                for piece in Piece::ALL {
                    assert_eq!(
                        self.squares(side, piece).is_set(sq),
                        self.grid[sq.index()] == Some((side, piece)),
                        "index mismatch for {side} {piece} on {sq}",
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in Rank::ALL.into_iter().rev() {
            s.push(rank.to_char());
            s.push(' ');
            for file in File::ALL {
                let ch = match self.at(Square::new(file, rank)) {
                    Some((side, piece)) => piece.to_char(side),
                    None => '.',
                };
                s.push(ch);
                if file != File::H {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board")?;
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
