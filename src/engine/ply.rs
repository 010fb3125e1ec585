//! Plies: reversible, atomic board edits.
//!
//! A `Ply` carries the fields every half-move has (side, piece, from, to)
//! plus a closed `PlyKind` describing what is special about it. `execute`
//! and `undo` are exact inverses: `undo(execute(board)) == board`.

use std::fmt;

use crate::engine::board::Board;
use crate::engine::types::{CastleSide, Piece, Side, Square};

// ---------------------------------------------------------------------------
// PlyKind
// ---------------------------------------------------------------------------

/// What distinguishes a ply beyond moving one piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlyKind {
    /// Ordinary move, optionally capturing on the destination.
    Standard { captured: Option<Piece> },
    /// King and rook move together.
    Castle(CastleSide),
    /// Pawn capture where the taken pawn stands on `passed`, not on `to`.
    EnPassant { passed: Square },
    /// Pawn reaching the last rank. `promote_to` is `None` until chosen.
    Promotion {
        captured: Option<Piece>,
        promote_to: Option<Piece>,
    },
}

/// Source information algebraic notation needs to tell apart several
/// same-piece moves to one destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Disambiguation {
    #[default]
    None,
    File,
    Rank,
    Square,
}

impl Disambiguation {
    /// Pick the disambiguation for a move whose source is among `sources`,
    /// the origins of all legal same-piece moves to the same destination.
    pub fn resolve(sources: &[Square]) -> Disambiguation {
        match sources {
            [a, b] if a.file() == b.file() => Disambiguation::Rank,
            [_, _] => Disambiguation::File,
            s if s.len() > 2 => Disambiguation::Square,
            _ => Disambiguation::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ply
// ---------------------------------------------------------------------------

/// One half-move.
///
/// `disambiguation` and `gives_check` only affect notation. They are filled
/// in once the ply is played and ignored by [`Ply::same_move`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ply {
    turn: Side,
    piece: Piece,
    from: Square,
    to: Square,
    kind: PlyKind,
    disambiguation: Disambiguation,
    gives_check: bool,
}

impl Ply {
    fn new(turn: Side, piece: Piece, from: Square, to: Square, kind: PlyKind) -> Self {
        Ply {
            turn,
            piece,
            from,
            to,
            kind,
            disambiguation: Disambiguation::None,
            gives_check: false,
        }
    }

    pub fn standard(
        turn: Side,
        piece: Piece,
        from: Square,
        to: Square,
        captured: Option<Piece>,
    ) -> Self {
        Ply::new(turn, piece, from, to, PlyKind::Standard { captured })
    }

    pub fn castle(turn: Side, castle: CastleSide) -> Self {
        Ply::new(
            turn,
            Piece::King,
            castle.king_from(turn),
            castle.king_to(turn),
            PlyKind::Castle(castle),
        )
    }

    /// En-passant capture; the taken pawn sits beside `from` on `to`'s file.
    pub fn en_passant(turn: Side, from: Square, to: Square) -> Self {
        let passed = Square::new(to.file(), from.rank());
        Ply::new(turn, Piece::Pawn, from, to, PlyKind::EnPassant { passed })
    }

    /// Promotion with no piece chosen yet.
    pub fn promotion(turn: Side, from: Square, to: Square, captured: Option<Piece>) -> Self {
        Ply::new(
            turn,
            Piece::Pawn,
            from,
            to,
            PlyKind::Promotion {
                captured,
                promote_to: None,
            },
        )
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn turn(&self) -> Side {
        self.turn
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn from(&self) -> Square {
        self.from
    }

    #[inline]
    pub fn to(&self) -> Square {
        self.to
    }

    #[inline]
    pub fn kind(&self) -> PlyKind {
        self.kind
    }

    pub fn disambiguation(&self) -> Disambiguation {
        self.disambiguation
    }

    pub fn gives_check(&self) -> bool {
        self.gives_check
    }

    /// The opponent piece this ply removes from the board.
    pub fn captured_piece(&self) -> Option<Piece> {
        match self.kind {
            PlyKind::Standard { captured } | PlyKind::Promotion { captured, .. } => captured,
            PlyKind::EnPassant { .. } => Some(Piece::Pawn),
            PlyKind::Castle(_) => None,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece().is_some()
    }

    /// Whether this ply resets the half-move clock.
    pub fn is_pawn_move_or_capture(&self) -> bool {
        self.piece == Piece::Pawn || self.is_capture()
    }

    /// A pawn advancing two squares from its starting rank.
    pub fn is_double_pawn_push(&self) -> bool {
        matches!(self.kind, PlyKind::Standard { .. })
            && self.piece == Piece::Pawn
            && self.from.rank() == self.turn.pawn_start_rank()
            && self.from.file() == self.to.file()
            && self.to.rank().index().abs_diff(self.from.rank().index()) == 2
    }

    /// The chosen promotion piece, if this is a resolved promotion.
    pub fn promotion_piece(&self) -> Option<Piece> {
        match self.kind {
            PlyKind::Promotion { promote_to, .. } => promote_to,
            _ => None,
        }
    }

    pub fn is_promotion(&self) -> bool {
        matches!(self.kind, PlyKind::Promotion { .. })
    }

    /// A promotion still waiting for its piece.
    pub fn is_pending_promotion(&self) -> bool {
        matches!(
            self.kind,
            PlyKind::Promotion {
                promote_to: None,
                ..
            }
        )
    }

    /// Whether `self` and `other` describe the same board edit, ignoring
    /// notation fields and the promotion choice.
    pub fn same_move(&self, other: &Ply) -> bool {
        self.turn == other.turn
            && self.piece == other.piece
            && self.from == other.from
            && self.to == other.to
            && match (self.kind, other.kind) {
                (
                    PlyKind::Promotion { captured: a, .. },
                    PlyKind::Promotion { captured: b, .. },
                ) => a == b,
                (a, b) => a == b,
            }
    }

    // -----------------------------------------------------------------------
    // Promotion choice & notation fields
    // -----------------------------------------------------------------------

    /// Choose the promotion piece.
    ///
    /// # Panics
    ///
    /// If this is not a promotion, or `piece` is a pawn or king.
    pub fn accept(&mut self, piece: Piece) {
        assert!(
            piece.is_promotion_target(),
            "cannot promote to {piece}"
        );
        assert!(self.is_promotion(), "{self} is not a promotion");
        if let PlyKind::Promotion { promote_to, .. } = &mut self.kind {
            *promote_to = Some(piece);
        }
    }

    /// Copy of this ply promoting to `piece`.
    pub fn with_promotion(mut self, piece: Piece) -> Ply {
        self.accept(piece);
        self
    }

    pub(crate) fn set_disambiguation(&mut self, disambiguation: Disambiguation) {
        self.disambiguation = disambiguation;
    }

    pub(crate) fn set_gives_check(&mut self, gives_check: bool) {
        self.gives_check = gives_check;
    }

    // -----------------------------------------------------------------------
    // Execute / undo
    // -----------------------------------------------------------------------

    /// Apply this ply to `board`.
    ///
    /// # Panics
    ///
    /// If the board does not match what the ply declares: a missing piece, a
    /// different capture, or an unresolved promotion.
    pub fn execute(&self, board: &mut Board) {
        let (turn, from, to) = (self.turn, self.from, self.to);
        match self.kind {
            PlyKind::Standard { captured } => {
                let taken = board.move_piece(from, to, turn);
                assert_eq!(taken, captured, "{self}: capture on {to} does not match");
            }
            PlyKind::Castle(castle) => {
                assert!(
                    board.has_piece_side(Piece::King, turn, from),
                    "{self}: no {turn} king on {from}"
                );
                let rook_from = castle.rook_from(turn);
                assert!(
                    board.has_piece_side(Piece::Rook, turn, rook_from),
                    "{self}: no {turn} rook on {rook_from}"
                );
                board.move_piece(from, to, turn);
                board.move_piece(rook_from, castle.pass(turn), turn);
            }
            PlyKind::EnPassant { passed } => {
                let taken = board.move_piece(from, to, turn);
                assert_eq!(taken, None, "{self}: en passant onto occupied {to}");
                assert!(
                    board.has_piece_side(Piece::Pawn, turn.other(), passed),
                    "{self}: no {} pawn on {passed}",
                    turn.other()
                );
                board.remove(passed);
            }
            PlyKind::Promotion {
                captured,
                promote_to,
            } => {
                let Some(result) = promote_to else {
                    panic!("promotion {from}{to} executed before a piece was chosen");
                };
                assert_eq!(
                    from.rank(),
                    turn.other().pawn_start_rank(),
                    "{self}: promotion must start next to the last rank"
                );
                assert_eq!(
                    to.rank(),
                    turn.promotion_rank(),
                    "{self}: promotion must land on the last rank"
                );
                let pawn = board.remove(from);
                assert_eq!(pawn, Some((turn, Piece::Pawn)), "{self}: no pawn on {from}");
                if captured.is_some() {
                    let taken = board.remove(to).map(|(_, p)| p);
                    assert_eq!(taken, captured, "{self}: capture on {to} does not match");
                }
                board.add(result, turn, to);
            }
        }
    }

    /// Reverse a previous [`Ply::execute`] of this exact ply.
    pub fn undo(&self, board: &mut Board) {
        let (turn, from, to) = (self.turn, self.from, self.to);
        match self.kind {
            PlyKind::Standard { captured } => {
                board.move_piece(to, from, turn);
                if let Some(piece) = captured {
                    board.add(piece, turn.other(), to);
                }
            }
            PlyKind::Castle(castle) => {
                board.move_piece(castle.pass(turn), castle.rook_from(turn), turn);
                board.move_piece(to, from, turn);
            }
            PlyKind::EnPassant { passed } => {
                board.move_piece(to, from, turn);
                board.add(Piece::Pawn, turn.other(), passed);
            }
            PlyKind::Promotion {
                captured,
                promote_to,
            } => {
                let removed = board.remove(to);
                debug_assert_eq!(removed.map(|(_, p)| p), promote_to);
                board.add(Piece::Pawn, turn, from);
                if let Some(piece) = captured {
                    board.add(piece, turn.other(), to);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Notation
    // -----------------------------------------------------------------------

    /// Standard algebraic notation, e.g. `Nbd7`, `exd6`, `e8=Q+`, `O-O`.
    pub fn to_algebraic(&self) -> String {
        let mut s = String::with_capacity(8);
        if let PlyKind::Castle(castle) = self.kind {
            s.push_str(castle.notation());
        } else {
            s.push_str(self.piece.symbol());
            let disambiguation = if self.piece == Piece::Pawn {
                if self.is_capture() {
                    Disambiguation::File
                } else {
                    Disambiguation::None
                }
            } else {
                self.disambiguation
            };
            match disambiguation {
                Disambiguation::None => {}
                Disambiguation::File => s.push(self.from.file().to_char()),
                Disambiguation::Rank => s.push(self.from.rank().to_char()),
                Disambiguation::Square => s.push_str(&self.from.to_algebraic()),
            }
            if self.is_capture() {
                s.push('x');
            }
            s.push_str(&self.to.to_algebraic());
            if let Some(piece) = self.promotion_piece() {
                s.push('=');
                s.push_str(piece.symbol());
            }
        }
        if self.gives_check {
            s.push('+');
        }
        s
    }

    /// Coordinate form, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> String {
        match self.promotion_piece() {
            Some(piece) => format!("{}{}{}", self.from, self.to, piece.to_char(Side::Black)),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for Ply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
