//! Requests players make and the events a game records.

use crate::hand::Suit;
use crate::PlayerId;
use serde::{Deserialize, Serialize};

/// A request for a card: "do you have a `suit`?" addressed to `holder`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    pub holder: PlayerId,
    pub suit: Suit,
}

impl Request {
    pub fn new(holder: PlayerId, suit: Suit) -> Self {
        Self { holder, suit }
    }
}

/// Events that occur during a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A request was made and answered
    Asked {
        asker: PlayerId,
        holder: PlayerId,
        suit: Suit,
        /// Whether the holder handed over a card
        handed: bool,
    },

    /// A player with no cards left was passed over
    Skipped { player: PlayerId },
}
