pub mod api;
pub mod board;
pub mod ending;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod pgn;
pub mod ply;
pub mod san;
pub mod state;
pub mod strategy;
pub mod types;

pub use api::{BoardView, PlyView};
pub use board::Board;
pub use game::Game;
pub use movegen::legal_plies;
pub use ply::{Disambiguation, Ply, PlyKind};
pub use state::GameState;
pub use types::*;
