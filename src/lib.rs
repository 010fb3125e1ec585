//! Chess rules engine.
//!
//! [`engine::Game`] drives a game: it tracks the board, the side to move and
//! the ply history, exposes the legal plies and classifies the ending.
//! `engine::fen`, `engine::san` and `engine::pgn` read and write the usual
//! text notations on top of it.
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod engine;

pub use config::Settings;
