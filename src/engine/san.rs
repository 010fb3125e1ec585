//! Standard Algebraic Notation (SAN) matching.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.
//!
//! A token is matched against the game's current legal plies rather than
//! turned into a ply directly, so anything accepted here is playable.

use crate::engine::api::PlyView;
use crate::engine::game::Game;
use crate::engine::ply::{Ply, PlyKind};
use crate::engine::types::{CastleSide, ChessError, File, Piece, Rank, Square};

/// A SAN token broken into the parts used for matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SanToken {
    piece: Piece,
    file: Option<File>,
    rank: Option<Rank>,
    to: Square,
    promote_to: Option<Piece>,
}

impl SanToken {
    fn parse(san: &str) -> Result<SanToken, ChessError> {
        let invalid = |reason: &str| ChessError::InvalidMove {
            token: san.to_string(),
            reason: reason.to_string(),
        };

        // Promotion suffix.
        let (body, promote_to) = match san.split_once('=') {
            Some((body, symbol)) => {
                let piece = Piece::from_symbol(symbol)
                    .filter(|p| p.is_promotion_target())
                    .ok_or_else(|| ChessError::InvalidPromotion(symbol.to_string()))?;
                (body, Some(piece))
            }
            None => (san, None),
        };

        // Piece letter; pawns have none.
        let (piece, rest) = match body.get(..1).and_then(Piece::from_symbol) {
            Some(piece) if piece != Piece::Pawn => (piece, &body[1..]),
            _ => (Piece::Pawn, body),
        };

        let chars: Vec<char> = rest.chars().filter(|&c| c != 'x').collect();
        if chars.len() < 2 || chars.len() > 4 {
            return Err(invalid("expected a destination square"));
        }

        let dest: String = chars[chars.len() - 2..].iter().collect();
        let to = Square::from_algebraic(&dest).ok_or(ChessError::InvalidSquare(dest))?;

        let mut file = None;
        let mut rank = None;
        for &c in &chars[..chars.len() - 2] {
            if let Some(f) = File::from_char(c)
                && file.is_none()
                && rank.is_none()
            {
                file = Some(f);
            } else if let Some(r) = Rank::from_char(c)
                && rank.is_none()
            {
                rank = Some(r);
            } else {
                return Err(invalid("malformed disambiguation"));
            }
        }

        Ok(SanToken {
            piece,
            file,
            rank,
            to,
            promote_to,
        })
    }

    fn matches(&self, ply: &impl PlyView) -> bool {
        ply.piece() == self.piece
            && ply.to() == self.to
            && self.file.is_none_or(|f| ply.from().file() == f)
            && self.rank.is_none_or(|r| ply.from().rank() == r)
    }
}

fn castle_side(san: &str) -> Option<CastleSide> {
    match san {
        "O-O" | "0-0" => Some(CastleSide::KingSide),
        "O-O-O" | "0-0-0" => Some(CastleSide::QueenSide),
        _ => None,
    }
}

/// Find the legal ply in `game` that `token` names.
///
/// Check and annotation suffixes (`+`, `#`, `!`, `?`) are ignored. A
/// promotion piece in the token is applied to the returned ply.
pub fn find_ply(game: &Game, token: &str) -> Result<Ply, ChessError> {
    let san = token.trim().trim_end_matches(['+', '#', '!', '?']);
    let invalid = |reason: String| ChessError::InvalidMove {
        token: token.to_string(),
        reason,
    };
    if san.is_empty() {
        return Err(invalid("empty move".into()));
    }

    let legal = game.legal_plies();

    if let Some(castle) = castle_side(san) {
        return legal
            .iter()
            .find(|ply| ply.kind() == PlyKind::Castle(castle))
            .copied()
            .ok_or_else(|| invalid(format!("{} is not legal", castle.notation())));
    }

    let parsed = SanToken::parse(san)?;
    let candidates: Vec<&Ply> = legal
        .iter()
        .filter(|ply| !matches!(ply.kind(), PlyKind::Castle(_)))
        .filter(|ply| parsed.matches(*ply))
        .collect();

    let ply = match candidates.as_slice() {
        [] => return Err(invalid("no legal ply matches".into())),
        [ply] => **ply,
        many => return Err(invalid(format!("ambiguous: {} candidates", many.len()))),
    };

    match (ply.is_promotion(), parsed.promote_to) {
        (true, Some(piece)) => Ok(ply.with_promotion(piece)),
        (true, None) if game.requires_promotion(&ply) => Err(ChessError::InvalidPromotion(
            format!("{token} needs a promotion piece"),
        )),
        (false, Some(piece)) => Err(invalid(format!("not a promotion, cannot become {piece}"))),
        _ => Ok(ply),
    }
}

// =========================================================================
// Tests
// =========================================================================
