//! Ending classifier.
//!
//! Decides, after every state transition, whether the game has ended by
//! checkmate, stalemate, the move rule, insufficient material or repetition.
//! Resignation and agreed draws are player actions handled by `Game`.

use crate::config::Settings;
use crate::engine::board::Board;
use crate::engine::ply::Ply;
use crate::engine::state::GameState;
use crate::engine::types::{CheckCount, Outcome, Piece, Side, Square};

/// The ending reached in `state`, or `None` if play continues.
///
/// `legal` is the set of plies available to the side to move, `history`
/// every ply played so far, oldest first.
pub fn classify(
    state: &GameState,
    legal: &[Ply],
    board: &Board,
    history: &[Ply],
    settings: &Settings,
) -> Option<Outcome> {
    if legal.is_empty() {
        return Some(if state.check_count() != CheckCount::None {
            Outcome::CheckMate
        } else {
            Outcome::StaleMate
        });
    }
    if is_draw_by_move_rule(state, history, settings.move_rule_count) {
        return Some(Outcome::DrawByMoveRule);
    }
    if is_insufficient_material(board) {
        return Some(Outcome::DrawByInsufficientMaterial);
    }
    if is_draw_by_repetition(state, board, history, settings.repetition_count) {
        return Some(Outcome::DrawByRepetition);
    }
    None
}

/// The clock must equal `2 * count - 1` exactly, and the ply that got it
/// there must not itself be a pawn move or capture.
pub fn is_draw_by_move_rule(state: &GameState, history: &[Ply], count: u32) -> bool {
    let threshold = count.saturating_mul(2).saturating_sub(1);
    let last_irreversible = history
        .last()
        .or(state.last_ply())
        .is_some_and(|ply| ply.is_pawn_move_or_capture());
    state.half_move_clock() == threshold && !last_irreversible
}

/// Material with which neither side can mate. Positions without both kings
/// never qualify.
pub fn is_insufficient_material(board: &Board) -> bool {
    if board.king_square(Side::White).is_none() || board.king_square(Side::Black).is_none() {
        return false;
    }

    let mut kinds: Vec<Piece> = Vec::with_capacity(Piece::COUNT);
    let mut others: Vec<(Piece, Square)> = Vec::new();
    for side in Side::ALL {
        board.for_each_piece(side, |piece, sq| {
            if piece != Piece::King {
                others.push((piece, sq));
                if !kinds.contains(&piece) {
                    kinds.push(piece);
                }
            }
        });
    }

    match (kinds.as_slice(), others.as_slice()) {
        ([], _) => true,
        ([Piece::Knight | Piece::Bishop], [_]) => true,
        ([Piece::Bishop], [(_, a), (_, b)]) => a.is_light() == b.is_light(),
        _ => false,
    }
}

/// Replays `history` backwards from `board` and counts earlier positions
/// with the same side to move and identical piece placement. Castling
/// rights and en-passant availability are not compared.
pub fn is_draw_by_repetition(
    state: &GameState,
    board: &Board,
    history: &[Ply],
    count: u32,
) -> bool {
    if history.len() < count as usize * 2 {
        return false;
    }
    let mut seen = 1;
    let mut replay = board.clone();
    for ply in history.iter().rev() {
        ply.undo(&mut replay);
        if ply.turn() == state.turn() && replay == *board {
            seen += 1;
            if seen == count {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fen;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn material(fen_str: &str) -> bool {
        let (board, _) = fen::parse(fen_str).unwrap();
        is_insufficient_material(&board)
    }

    #[test]
    fn bare_kings() {
        assert!(material("8/8/4k3/8/8/3K4/8/8 w - - 0 1"));
    }

    #[test]
    fn single_minor_piece() {
        assert!(material("8/8/4k3/8/8/3K4/5N2/8 w - - 0 1"));
        assert!(material("8/8/4k3/2b5/8/3K4/8/8 w - - 0 1"));
    }

    #[test]
    fn two_knights_are_not_a_draw() {
        assert!(!material("8/8/4k3/8/8/3K4/4NN2/8 w - - 0 1"));
    }

    #[test]
    fn bishops_on_same_colour() {
        // c5 and f8 are both dark.
        assert!(sq("c5").is_light() == sq("f8").is_light());
        assert!(material("5B2/8/4k3/2b5/8/3K4/8/8 w - - 0 1"));
    }

    #[test]
    fn bishops_on_opposite_colours() {
        assert!(!material("4B3/8/4k3/2b5/8/3K4/8/8 w - - 0 1"));
    }

    #[test]
    fn knight_and_bishop_not_a_draw() {
        assert!(!material("8/8/4k3/2b5/8/3K4/5N2/8 w - - 0 1"));
    }

    #[test]
    fn pawn_or_major_piece_not_a_draw() {
        assert!(!material("8/8/4k3/8/8/3K4/5P2/8 w - - 0 1"));
        assert!(!material("8/8/4k3/8/8/3K4/5R2/8 w - - 0 1"));
        assert!(!material("8/8/4k3/8/8/3K4/5Q2/8 w - - 0 1"));
    }

    #[test]
    fn missing_king_never_insufficient() {
        assert!(!material("8/8/8/8/8/3K4/8/8 w - - 0 1"));
    }

    #[test]
    fn move_rule_boundary_is_exact() {
        let knight = Ply::standard(Side::Black, Piece::Knight, sq("g8"), sq("f6"), None);
        let at = |clock| GameState::new(Side::White, Some(knight), Default::default(), clock, 60);
        assert!(!is_draw_by_move_rule(&at(98), &[knight], 50));
        assert!(is_draw_by_move_rule(&at(99), &[knight], 50));
        assert!(!is_draw_by_move_rule(&at(100), &[knight], 50));
        assert!(is_draw_by_move_rule(&at(9), &[], 5));
    }

    #[test]
    fn huge_move_rule_saturates() {
        let count = u32::MAX / 2 + 1;
        let state = GameState::new(Side::White, None, Default::default(), u32::MAX - 1, 1);
        assert!(is_draw_by_move_rule(&state, &[], count));
        assert!(!is_draw_by_move_rule(&GameState::default(), &[], count));

        let game = crate::engine::game::Game::new(Settings {
            move_rule_count: count,
            ..Settings::default()
        });
        assert!(!game.is_over());
    }

    #[test]
    fn move_rule_ignores_irreversible_last_ply() {
        let push = Ply::standard(Side::Black, Piece::Pawn, sq("a7"), sq("a6"), None);
        let state = GameState::new(Side::White, Some(push), Default::default(), 99, 60);
        assert!(!is_draw_by_move_rule(&state, &[push], 50));
    }

    #[test]
    fn repetition_needs_enough_history() {
        let board = Board::standard();
        assert!(!is_draw_by_repetition(&GameState::default(), &board, &[], 3));
    }

    #[test]
    fn repetition_counts_same_side_positions() {
        let mut board = Board::standard();
        let shuffle = [
            Ply::standard(Side::White, Piece::Knight, sq("g1"), sq("f3"), None),
            Ply::standard(Side::Black, Piece::Knight, sq("g8"), sq("f6"), None),
            Ply::standard(Side::White, Piece::Knight, sq("f3"), sq("g1"), None),
            Ply::standard(Side::Black, Piece::Knight, sq("f6"), sq("g8"), None),
        ];
        let mut history = Vec::new();
        for ply in shuffle.iter().chain(shuffle.iter()) {
            ply.execute(&mut board);
            history.push(*ply);
        }
        let state = GameState::default();
        assert!(is_draw_by_repetition(&state, &board, &history, 3));
        assert!(!is_draw_by_repetition(&state, &board, &history[..4], 3));
        assert!(is_draw_by_repetition(&state, &board, &history[..4], 2));
    }
}
