//! Per-ply game snapshot.

use crate::engine::board::Board;
use crate::engine::movegen;
use crate::engine::ply::Ply;
use crate::engine::types::{CastleSide, CastlingRights, CheckCount, Piece, Side};

/// Everything about a position that is not piece placement.
///
/// Snapshots are never mutated in place: [`GameState::next`] builds the
/// successor after each ply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    turn: Side,
    last_ply: Option<Ply>,
    check_count: CheckCount,
    castling: CastlingRights,
    half_move_clock: u32,
    full_move_index: u32,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(Side::White, None, CastlingRights::ALL, 0, 1)
    }
}

impl GameState {
    /// Snapshot with no check recorded. Use [`GameState::with_check_count`]
    /// to probe the board for one.
    pub fn new(
        turn: Side,
        last_ply: Option<Ply>,
        castling: CastlingRights,
        half_move_clock: u32,
        full_move_index: u32,
    ) -> Self {
        GameState {
            turn,
            last_ply,
            check_count: CheckCount::None,
            castling,
            half_move_clock,
            full_move_index,
        }
    }

    #[inline]
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn last_ply(&self) -> Option<&Ply> {
        self.last_ply.as_ref()
    }

    #[inline]
    pub fn check_count(&self) -> CheckCount {
        self.check_count
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    pub fn full_move_index(&self) -> u32 {
        self.full_move_index
    }

    /// Same snapshot with the check count recomputed from `board`.
    pub fn with_check_count(mut self, board: &Board) -> Self {
        self.check_count = king_check_count(board, self.turn);
        self
    }

    /// Snapshot after `ply` has been executed on `board`.
    pub fn next(&self, ply: &Ply, board: &Board) -> GameState {
        debug_assert_eq!(ply.turn(), self.turn, "{ply} played out of turn");

        let mover = self.turn;
        let opponent = mover.other();

        let mut castling = self.castling;
        if ply.piece() == Piece::King {
            castling.clear(mover);
        } else if ply.piece() == Piece::Rook {
            for castle in CastleSide::ALL {
                if ply.from() == castle.rook_from(mover) {
                    castling.remove(mover, castle);
                }
            }
        }
        if ply.captured_piece() == Some(Piece::Rook) {
            for castle in CastleSide::ALL {
                if ply.to() == castle.rook_from(opponent) {
                    castling.remove(opponent, castle);
                }
            }
        }

        let half_move_clock = if ply.is_pawn_move_or_capture() {
            0
        } else {
            self.half_move_clock + 1
        };
        let full_move_index = match mover {
            Side::White => self.full_move_index,
            Side::Black => self.full_move_index + 1,
        };

        GameState {
            turn: opponent,
            last_ply: Some(*ply),
            check_count: king_check_count(board, opponent),
            castling,
            half_move_clock,
            full_move_index,
        }
    }
}

/// How many of `side`'s opponents attack `side`'s king; none without a king.
fn king_check_count(board: &Board, side: Side) -> CheckCount {
    board
        .king_square(side)
        .map_or(CheckCount::None, |king| {
            movegen::check_count(board, king, side.other())
        })
}
