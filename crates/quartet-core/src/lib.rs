//! Quartet - a deduction engine for the quartets card game
//!
//! Every player holds cards from as many suits as there are players, four
//! cards to a suit. On their turn a player asks another for a suit they hold
//! themselves; the first to collect four of a kind wins. Nobody sees anyone
//! else's cards, so the game is one of deduction.
//!
//! This crate provides:
//! - Knowledge of every hand, tightened to a fixed point after each request
//! - Detection of wins, forced answers and impossible tables
//! - Canonical positions that fold together symmetric tables
//! - A lookahead search with a shared transposition cache
//!
//! # Modules
//!
//! - [`hand`]: What is known about a single hand
//! - [`cards`]: The whole table, requests and winners
//! - [`propagate`]: The shakedown fixed point
//! - [`canon`]: Canonical positions and game history
//! - [`search`]: Choosing requests and answers by lookahead
//! - [`player`]: Random, scripted and search players
//! - [`game`]: Playing a game to the end

pub mod actions;
pub mod canon;
pub mod cards;
pub mod config;
pub mod error;
pub mod game;
pub mod hand;
pub mod player;
pub mod propagate;
pub mod search;

/// Seat index at the table, `0..number_of_players`
pub type PlayerId = usize;

// Re-export commonly used types
pub use actions::{GameEvent, Request};
pub use canon::{History, Position};
pub use cards::{Cards, Verdict, MAX_PLAYERS};
pub use config::{is_rotation_symmetric, preferences_from_flat, SearchConfig};
pub use error::GameError;
pub use game::{play, GameRecord};
pub use hand::{Hand, Suit, CARDS_PER_SUIT};
pub use player::{Player, RandomPlayer, ScriptedPlayer};
pub use search::{Evaluation, Outcome, SearchPlayer};
