//! Per-piece move strategies.
//!
//! Every strategy answers two questions about a piece standing on a square:
//!
//! - which pseudo-legal plies it has ([`PlyStrategy::plies`]), ignoring
//!   whether they expose the mover's own king, and
//! - whether it could capture on a given square ([`PlyStrategy::can_attack`]),
//!   ignoring whose turn it is and self-check.
//!
//! Legality filtering is built on `can_attack` only, never on `plies`, so
//! asking "is this square attacked" never recurses into legality.

mod king;
mod knight;
mod pawn;
mod sliding;

pub use king::KingStrategy;
pub use knight::KnightStrategy;
pub use pawn::PawnStrategy;
pub use sliding::SlidingStrategy;

use crate::engine::board::Board;
use crate::engine::ply::Ply;
use crate::engine::state::GameState;
use crate::engine::types::{CheckCount, Direction, Piece, Side, Square};

// ---------------------------------------------------------------------------
// PlyStrategy
// ---------------------------------------------------------------------------

/// Move rules for one piece kind.
pub trait PlyStrategy {
    fn piece(&self) -> Piece;

    /// Whether this piece may move at all given the mover's check count.
    /// Only the king can answer a double check.
    fn can_move_in_check(&self, check_count: CheckCount) -> bool {
        check_count != CheckCount::Two
    }

    /// Append pseudo-legal plies that don't fit the slide/step patterns.
    fn push_special_plies(
        &self,
        _from: Square,
        _board: &Board,
        _state: &GameState,
        _out: &mut Vec<Ply>,
    ) {
    }

    /// Append plies from sliding and stepping.
    fn push_simple_plies(&self, from: Square, board: &Board, side: Side, out: &mut Vec<Ply>);

    /// Whether this piece on `from`, owned by `side`, could capture on `to`.
    fn can_attack(&self, from: Square, to: Square, board: &Board, side: Side) -> bool;

    /// Append the pseudo-legal plies of the piece on `from` for the side to
    /// move in `state`.
    fn plies(&self, from: Square, board: &Board, state: &GameState, out: &mut Vec<Ply>) {
        assert!(
            board.has_piece_side(self.piece(), state.turn(), from),
            "no {} {} on {from}",
            state.turn(),
            self.piece()
        );
        if self.can_move_in_check(state.check_count()) {
            self.push_simple_plies(from, board, state.turn(), out);
            self.push_special_plies(from, board, state, out);
        }
    }
}

static PAWN: PawnStrategy = PawnStrategy;
static KNIGHT: KnightStrategy = KnightStrategy;
static BISHOP: SlidingStrategy = SlidingStrategy::new(Piece::Bishop, &Direction::DIAGONAL);
static ROOK: SlidingStrategy = SlidingStrategy::new(Piece::Rook, &Direction::ORTHOGONAL);
static QUEEN: SlidingStrategy = SlidingStrategy::new(Piece::Queen, &Direction::ALL);
static KING: KingStrategy = KingStrategy;

/// The strategy for `piece`.
pub fn for_piece(piece: Piece) -> &'static dyn PlyStrategy {
    match piece {
        Piece::Pawn => &PAWN,
        Piece::Knight => &KNIGHT,
        Piece::Bishop => &BISHOP,
        Piece::Rook => &ROOK,
        Piece::Queen => &QUEEN,
        Piece::King => &KING,
    }
}

// ---------------------------------------------------------------------------
// Shared walkers
// ---------------------------------------------------------------------------

/// Walk `direction` from `from`, appending a ply for every empty square and
/// for the first enemy-occupied square, stopping at the edge or any piece.
pub(crate) fn push_slide(
    piece: Piece,
    from: Square,
    direction: Direction,
    board: &Board,
    side: Side,
    out: &mut Vec<Ply>,
) {
    let mut next = from.step(direction);
    while let Some(to) = next {
        match board.at(to) {
            None => out.push(Ply::standard(side, piece, from, to, None)),
            Some((owner, _)) if owner == side => return,
            Some((_, captured)) => {
                out.push(Ply::standard(side, piece, from, to, Some(captured)));
                return;
            }
        }
        next = to.step(direction);
    }
}

/// Whether a walk along `direction` from `from` reaches `to` before leaving
/// the board or meeting a piece.
pub(crate) fn slide_reaches(
    from: Square,
    to: Square,
    direction: Direction,
    board: &Board,
) -> bool {
    let mut next = from.step(direction);
    while let Some(sq) = next {
        if sq == to {
            return true;
        }
        if !board.is_empty(sq) {
            return false;
        }
        next = sq.step(direction);
    }
    false
}

/// Append a ply for each `(file, rank)` offset that lands on the board and
/// not on a friendly piece.
pub(crate) fn push_steps(
    piece: Piece,
    from: Square,
    offsets: &[(i8, i8)],
    board: &Board,
    side: Side,
    out: &mut Vec<Ply>,
) {
    for &(df, dr) in offsets {
        if let Some(to) = from.offset(df, dr)
            && !board.has_side(side, to)
        {
            let captured = board.at(to).map(|(_, p)| p);
            out.push(Ply::standard(side, piece, from, to, captured));
        }
    }
}

/// Whether `to` is one of the `offsets` away from `from`.
pub(crate) fn step_reaches(from: Square, to: Square, offsets: &[(i8, i8)]) -> bool {
    offsets
        .iter()
        .any(|&(df, dr)| from.offset(df, dr) == Some(to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::CastlingRights;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn for_piece_matches_kind() {
        for piece in Piece::ALL {
            assert_eq!(for_piece(piece).piece(), piece);
        }
    }

    #[test]
    fn double_check_silences_everything_but_the_king() {
        for piece in Piece::ALL {
            let strategy = for_piece(piece);
            assert!(strategy.can_move_in_check(CheckCount::One));
            assert_eq!(
                strategy.can_move_in_check(CheckCount::Two),
                piece == Piece::King,
                "{piece}"
            );
        }
    }

    #[test]
    fn slide_stops_at_pieces() {
        let mut board = Board::empty();
        board.add(Piece::Rook, Side::White, sq("a1"));
        board.add(Piece::Pawn, Side::White, sq("a4"));
        board.add(Piece::Pawn, Side::Black, sq("d1"));

        let mut up = Vec::new();
        push_slide(Piece::Rook, sq("a1"), Direction::Up, &board, Side::White, &mut up);
        assert_eq!(up.len(), 2);

        let mut right = Vec::new();
        push_slide(Piece::Rook, sq("a1"), Direction::Right, &board, Side::White, &mut right);
        assert_eq!(right.len(), 3);
        assert_eq!(right[2].captured_piece(), Some(Piece::Pawn));
    }

    #[test]
    fn slide_reaches_first_blocker_only() {
        let mut board = Board::empty();
        board.add(Piece::Pawn, Side::Black, sq("c3"));
        assert!(slide_reaches(sq("a1"), sq("c3"), Direction::UpRight, &board));
        assert!(!slide_reaches(sq("a1"), sq("d4"), Direction::UpRight, &board));
        assert!(!slide_reaches(sq("a1"), sq("a2"), Direction::UpRight, &board));
    }

    #[test]
    fn plies_respects_double_check() {
        let mut board = Board::empty();
        board.add(Piece::King, Side::White, sq("e1"));
        board.add(Piece::Knight, Side::White, sq("b1"));
        board.add(Piece::Rook, Side::Black, sq("e8"));
        board.add(Piece::Knight, Side::Black, sq("d3"));

        let calm = GameState::new(Side::White, None, CastlingRights::NONE, 0, 1);
        let mut out = Vec::new();
        for_piece(Piece::Knight).plies(sq("b1"), &board, &calm, &mut out);
        assert_eq!(out.len(), 3);

        let checked = calm.with_check_count(&board);
        assert_eq!(checked.check_count(), CheckCount::Two);
        let mut out = Vec::new();
        for_piece(Piece::Knight).plies(sq("b1"), &board, &checked, &mut out);
        assert!(out.is_empty());
        for_piece(Piece::King).plies(sq("e1"), &board, &checked, &mut out);
        assert!(!out.is_empty());
    }

    #[test]
    #[should_panic(expected = "no white knight on c3")]
    fn plies_requires_the_piece() {
        let board = Board::standard();
        let state = GameState::default();
        for_piece(Piece::Knight).plies(sq("c3"), &board, &state, &mut Vec::new());
    }
}
