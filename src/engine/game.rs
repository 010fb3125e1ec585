//! Stateful game controller.
//!
//! `Game` owns the board, the ply history and the current `GameState`. After
//! every ply it recomputes the legal plies and asks the ending classifier
//! whether the game is over. It is the primary type callers interact with.

use tracing::{debug, info};

use crate::config::Settings;
use crate::engine::board::Board;
use crate::engine::ending;
use crate::engine::movegen;
use crate::engine::ply::{Disambiguation, Ply};
use crate::engine::state::GameState;
use crate::engine::types::{Outcome, Piece, Side, Square};

// =========================================================================
// Game
// =========================================================================

/// A chess game from some starting position to its (eventual) end.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    settings: Settings,
    state: GameState,
    history: Vec<Ply>,
    legal: Vec<Ply>,
    outcome: Option<Outcome>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A new game from the standard starting position.
    pub fn new(settings: Settings) -> Self {
        Self::from_position(Board::standard(), GameState::default(), settings)
    }

    /// A game continuing from an arbitrary position, e.g. a puzzle or a
    /// decoded FEN. The check count is recomputed from `board`.
    pub fn from_position(board: Board, state: GameState, settings: Settings) -> Self {
        let state = state.with_check_count(&board);
        let mut game = Game {
            board,
            settings,
            state,
            history: Vec::new(),
            legal: Vec::new(),
            outcome: None,
        };
        game.refresh();
        game
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Side to move.
    pub fn turn(&self) -> Side {
        self.state.turn()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Every ply the side to move may play. Empty once the game is over.
    pub fn legal_plies(&self) -> &[Ply] {
        &self.legal
    }

    /// Legal plies starting on `from`.
    pub fn legal_plies_from(&self, from: Square) -> Vec<Ply> {
        self.legal
            .iter()
            .filter(|ply| ply.from() == from)
            .copied()
            .collect()
    }

    /// Plies played so far, oldest first.
    pub fn all_plies(&self) -> &[Ply] {
        &self.history
    }

    /// A copy of the current board.
    pub fn board(&self) -> Board {
        self.board.clone()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Why the game ended, or `None` while it is in progress.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// PGN result token (`1-0`, `0-1`, `1/2-1/2`) once the game is over.
    pub fn result_string(&self) -> Option<&'static str> {
        self.outcome.map(|outcome| outcome.result_string(self.turn()))
    }

    /// Whether `ply` still needs a piece chosen before it can be played.
    pub fn requires_promotion(&self, ply: &Ply) -> bool {
        !self.settings.auto_promote && ply.is_pending_promotion()
    }

    // -----------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------

    /// Choose the piece a promotion ply resolves to.
    ///
    /// # Panics
    ///
    /// If `ply` is not a promotion or `piece` is a pawn or king.
    pub fn promote(&self, piece: Piece, ply: &mut Ply) {
        ply.accept(piece);
    }

    /// Play a legal ply.
    ///
    /// # Panics
    ///
    /// If the game is over, `ply` is not currently legal, or `ply` is a
    /// promotion that still needs its piece.
    pub fn play(&mut self, ply: Ply) {
        if let Some(outcome) = self.outcome {
            panic!("cannot play {ply}: game is over ({outcome})");
        }
        let Some(legal) = self.legal.iter().find(|p| p.same_move(&ply)) else {
            panic!("{ply} is not a legal ply");
        };

        let mut played = *legal;
        if let Some(piece) = ply.promotion_piece() {
            played.accept(piece);
        }
        assert!(
            !played.is_pending_promotion(),
            "promotion {} needs a piece before it can be played",
            played.to_uci()
        );

        let sources: Vec<Square> = self
            .legal
            .iter()
            .filter(|p| p.piece() == played.piece() && p.to() == played.to())
            .map(|p| p.from())
            .collect();
        played.set_disambiguation(Disambiguation::resolve(&sources));

        played.execute(&mut self.board);
        played.set_gives_check(movegen::gives_check(&self.board, &played));

        self.history.push(played);
        self.state = self.state.next(&played, &self.board);

        debug!(
            ply = %played,
            turn = %played.turn(),
            half_move_clock = self.state.half_move_clock(),
            "played ply"
        );

        self.refresh();
    }

    /// The side to move resigns.
    ///
    /// # Panics
    ///
    /// If the game is already over.
    pub fn resign(&mut self) {
        self.finish(Outcome::Resigned);
    }

    /// Both sides agree to a draw.
    ///
    /// # Panics
    ///
    /// If the game is already over.
    pub fn agree_to_draw(&mut self) {
        self.finish(Outcome::DrawByAgreement);
    }

    // -----------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------

    fn finish(&mut self, outcome: Outcome) {
        if let Some(previous) = self.outcome {
            panic!("cannot end game with {outcome}: already over ({previous})");
        }
        debug!(%outcome, turn = %self.turn(), "game ended by players");
        self.outcome = Some(outcome);
        self.legal.clear();
    }

    /// Recompute legal plies and the ending for the current state.
    fn refresh(&mut self) {
        self.legal = movegen::legal_plies(&mut self.board, &self.state);
        if self.settings.auto_promote {
            for ply in self.legal.iter_mut().filter(|p| p.is_pending_promotion()) {
                ply.accept(Piece::Queen);
            }
        }

        self.outcome = ending::classify(
            &self.state,
            &self.legal,
            &self.board,
            &self.history,
            &self.settings,
        );
        if let Some(outcome) = self.outcome {
            info!(
                %outcome,
                turn = %self.turn(),
                plies = self.history.len(),
                "game over"
            );
            self.legal.clear();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
