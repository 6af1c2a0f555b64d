//! Errors raised by the engine.

use crate::hand::Suit;
use crate::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while applying requests or driving a game
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Player {player} cannot ask for suit {suit}: their hand is known to hold none")]
    IllegalRequest { player: PlayerId, suit: Suit },

    #[error("Player {player} cannot answer that way about suit {suit}: it contradicts their known hand")]
    ContradictoryAnswer { player: PlayerId, suit: Suit },

    #[error("The hands are logically inconsistent")]
    Inconsistent,

    #[error("No player has any cards left")]
    ExhaustedPlayers,

    #[error("Player {player} has no request to make")]
    NoLegalMoves { player: PlayerId },

    #[error("Scripted player {player} has run out of recorded choices")]
    ScriptExhausted { player: PlayerId },

    #[error("Invalid hand notation: {0}")]
    InvalidNotation(String),

    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),
}
