//! Playing a whole game.
//!
//! Seats take turns in order. On each turn the player asks someone for a
//! suit, the holder answers, and the table is checked for a winner. The
//! table is then recorded from the asker's seat; one seen before ends the
//! game in a draw.

use crate::actions::{GameEvent, Request};
use crate::canon::History;
use crate::cards::{Cards, Verdict};
use crate::error::GameError;
use crate::player::Player;
use crate::search::Outcome;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything that happened in a finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub players: usize,
    pub events: Vec<GameEvent>,
    pub result: Outcome,
    pub final_cards: Cards,
}

impl GameRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of requests made
    pub fn requests(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::Asked { .. }))
            .count()
    }
}

/// Play a game to the end.
///
/// `seats[i]` is the index in `players` of whoever sits in seat `i`; one
/// player may fill several seats. Errors if a player breaks the rules or
/// runs out of things to do.
pub fn play(seats: &[usize], players: &mut [Player]) -> Result<GameRecord, GameError> {
    let n = seats.len();
    assert!(
        seats.iter().all(|&s| s < players.len()),
        "Every seat must refer to a player"
    );

    let mut cards = Cards::new(n);
    let mut history = History::default();
    let mut events = Vec::new();
    info!(players = n, "Starting game");

    loop {
        for asker in 0..n {
            if cards.is_empty(asker) {
                info!(player = asker, "Player has no cards and must skip");
                events.push(GameEvent::Skipped { player: asker });
                continue;
            }

            let Request { holder, suit } = players[seats[asker]].next_move(asker, &cards, &history)?;
            if !cards.legal(asker, holder, suit) {
                return Err(GameError::IllegalRequest { player: asker, suit });
            }
            let handed = players[seats[holder]].has_card(holder, asker, suit, &cards, &history)?;
            if handed {
                cards.transfer(suit, holder, asker)?;
            } else {
                cards.refuse(suit, holder, asker)?;
            }
            info!(player = asker, holder, suit, handed, cards = %cards, "Request answered");
            events.push(GameEvent::Asked {
                asker,
                holder,
                suit,
                handed,
            });

            let result = match cards.test_winner(asker) {
                Verdict::Inconsistent => return Err(GameError::Inconsistent),
                Verdict::Winner(winner) => Some(Outcome::Win(winner)),
                Verdict::NoWinnerYet => {
                    let pos = cards.position(asker);
                    (!history.insert(pos)).then_some(Outcome::Draw)
                }
            };
            if let Some(result) = result {
                info!(?result, cards = %cards, "Game over");
                return Ok(GameRecord {
                    players: n,
                    events,
                    result,
                    final_cards: cards,
                });
            }
        }
    }
}
