//! Forsyth-Edwards Notation.
//!
//! A FEN record has six space-separated fields: piece placement, side to
//! move, castling rights, en-passant target, half-move clock and full-move
//! number. Positions are built through `Board::add` and read back through
//! [`BoardView`], so this module never touches the board's index.

use tracing::trace;

use crate::config::Settings;
use crate::engine::api::BoardView;
use crate::engine::board::Board;
use crate::engine::game::Game;
use crate::engine::movegen;
use crate::engine::ply::Ply;
use crate::engine::state::GameState;
use crate::engine::types::{CastlingRights, ChessError, File, Piece, Rank, Side, Square};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// =========================================================================
// Parsing
// =========================================================================

/// Parse a FEN record into a board and the state to continue from.
///
/// Kings are optional (puzzle positions) but a side may not have two, and
/// positions no legal game could reach with the given side to move (pawns on
/// the back ranks, the waiting king in check, three checkers) are refused. An
/// en-passant target is loaded as the opponent's double pawn push, which is
/// how the pawn strategy recognises the capture.
pub fn parse(fen: &str) -> Result<(Board, GameState), ChessError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(ChessError::InvalidFen(format!(
            "expected 6 fields, got {}",
            fields.len()
        )));
    }

    // ----- Field 1: Piece placement -----
    let board = parse_placement(fields[0])?;

    // ----- Field 2: Side to move -----
    let turn = match fields[1] {
        "w" => Side::White,
        "b" => Side::Black,
        other => {
            return Err(ChessError::InvalidFen(format!(
                "invalid side to move: '{other}'"
            )));
        }
    };

    // ----- Field 3: Castling availability -----
    let castling = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
        ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
    })?;

    check_kings(&board, turn)?;

    // ----- Field 4: En passant target square -----
    let last_ply = match fields[3] {
        "-" => None,
        target => Some(double_push_to(&board, turn, target)?),
    };

    // ----- Field 5: Half-move clock -----
    let half_move_clock = fields[4].parse::<u32>().map_err(|_| {
        ChessError::InvalidFen(format!("invalid half-move clock: '{}'", fields[4]))
    })?;

    // ----- Field 6: Full-move number -----
    let full_move_index = fields[5].parse::<u32>().map_err(|_| {
        ChessError::InvalidFen(format!("invalid full-move number: '{}'", fields[5]))
    })?;
    if full_move_index == 0 {
        return Err(ChessError::InvalidFen(
            "full-move number must be >= 1".to_string(),
        ));
    }

    trace!(
        %turn,
        %castling,
        en_passant = fields[3],
        half_move_clock,
        full_move_index,
        "parsed FEN"
    );

    let state = GameState::new(turn, last_ply, castling, half_move_clock, full_move_index);
    Ok((board, state))
}

/// Start a game from a FEN record.
pub fn game_from_fen(fen: &str, settings: Settings) -> Result<Game, ChessError> {
    let (board, state) = parse(fen)?;
    Ok(Game::from_position(board, state, settings))
}

fn parse_placement(placement: &str) -> Result<Board, ChessError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::InvalidFen(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    let mut board = Board::empty();
    for (rank, row) in Rank::ALL.into_iter().rev().zip(ranks) {
        let mut file: u8 = 0;
        for ch in row.chars() {
            if let Some(digit) = ch.to_digit(10) {
                if !(1..=8).contains(&digit) {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid empty count '{ch}' in rank {rank}"
                    )));
                }
                file += digit as u8;
                if file > 8 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {rank}"
                    )));
                }
            } else if let Some((side, piece)) = Piece::from_char(ch) {
                let Some(f) = File::from_index(file) else {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {rank}"
                    )));
                };
                let sq = Square::new(f, rank);
                if piece == Piece::King && board.king_square(side).is_some() {
                    return Err(ChessError::InvalidFen(format!("{side} has two kings")));
                }
                if piece == Piece::Pawn && (rank == Rank::One || rank == Rank::Eight) {
                    return Err(ChessError::InvalidFen(format!("{side} pawn on {sq}")));
                }
                board.add(piece, side, sq);
                file += 1;
            } else {
                return Err(ChessError::InvalidFen(format!(
                    "invalid character '{ch}' in piece placement"
                )));
            }
        }
        if file != 8 {
            return Err(ChessError::InvalidFen(format!(
                "rank {rank} has {file} squares instead of 8"
            )));
        }
    }
    Ok(board)
}

/// The side to move may be checked at most twice; the other side not at all.
fn check_kings(board: &Board, turn: Side) -> Result<(), ChessError> {
    if let Some(king) = board.king_square(turn)
        && movegen::attacker_count(board, king, turn.other()) > 2
    {
        return Err(ChessError::InvalidFen(format!(
            "{turn} is checked by more than two pieces"
        )));
    }
    let waiting = turn.other();
    if let Some(king) = board.king_square(waiting)
        && movegen::is_attacked(board, king, turn)
    {
        return Err(ChessError::InvalidFen(format!(
            "{waiting} is in check but {turn} is to move"
        )));
    }
    Ok(())
}

/// The double push by `turn`'s opponent that makes `target` capturable.
fn double_push_to(board: &Board, turn: Side, target: &str) -> Result<Ply, ChessError> {
    let sq = Square::from_algebraic(target).ok_or_else(|| {
        ChessError::InvalidFen(format!("invalid en passant square: '{target}'"))
    })?;
    let pusher = turn.other();
    let (Some(landed), Some(origin)) = (
        sq.offset(0, pusher.forward()),
        sq.offset(0, -pusher.forward()),
    ) else {
        return Err(ChessError::InvalidFen(format!(
            "en passant square {target} is not on rank 3 or 6"
        )));
    };
    if origin.rank() != pusher.pawn_start_rank() {
        return Err(ChessError::InvalidFen(format!(
            "en passant square {target} does not fit {turn} to move"
        )));
    }
    if !board.has_piece_side(Piece::Pawn, pusher, landed) || !board.is_empty(sq) {
        return Err(ChessError::InvalidFen(format!(
            "en passant square {target} has no {pusher} pawn behind it"
        )));
    }
    Ok(Ply::standard(pusher, Piece::Pawn, origin, landed, None))
}

// =========================================================================
// Generation
// =========================================================================

/// Current position of `game` as a FEN record.
pub fn to_fen(game: &Game) -> String {
    let state = game.state();
    let mut fen = String::with_capacity(80);

    // ----- Field 1: Piece placement -----
    fen.push_str(&placement(&game.board()));

    // ----- Field 2: Side to move -----
    fen.push(' ');
    fen.push(match state.turn() {
        Side::White => 'w',
        Side::Black => 'b',
    });

    // ----- Field 3: Castling -----
    fen.push(' ');
    fen.push_str(&state.castling().to_fen());

    // ----- Field 4: En passant -----
    fen.push(' ');
    let skipped = state
        .last_ply()
        .filter(|ply| ply.is_double_pawn_push())
        .and_then(|ply| ply.from().offset(0, ply.turn().forward()));
    match skipped {
        Some(sq) => fen.push_str(&sq.to_algebraic()),
        None => fen.push('-'),
    }

    // ----- Field 5: Half-move clock -----
    fen.push(' ');
    fen.push_str(&state.half_move_clock().to_string());

    // ----- Field 6: Full-move number -----
    fen.push(' ');
    fen.push_str(&state.full_move_index().to_string());

    fen
}

/// The placement field, rank 8 first.
pub fn placement(board: &impl BoardView) -> String {
    let mut out = String::with_capacity(72);
    for rank in Rank::ALL.into_iter().rev() {
        let mut empty_count = 0u8;
        for file in File::ALL {
            match board.piece_at(Square::new(file, rank)) {
                Some((side, piece)) => {
                    if empty_count > 0 {
                        out.push((b'0' + empty_count) as char);
                        empty_count = 0;
                    }
                    out.push(piece.to_char(side));
                }
                None => empty_count += 1,
            }
        }
        if empty_count > 0 {
            out.push((b'0' + empty_count) as char);
        }
        if rank != Rank::One {
            out.push('/');
        }
    }
    out
}

// =========================================================================
// Tests
// =========================================================================
