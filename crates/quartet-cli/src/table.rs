//! Seating players at the table.

use crate::args::SeatKind;
use quartet_core::{play, GameError, GameRecord, Player, RandomPlayer, SearchConfig, SearchPlayer};

/// The players and who sits where
#[derive(Debug)]
pub struct Table {
    /// For each seat, the index of its player
    seats: Vec<usize>,
    players: Vec<Player>,
}

impl Table {
    /// Seat one player per kind; seats of the same kind share it, and so
    /// share a search cache.
    pub fn new(kinds: &[SeatKind], config: &SearchConfig, seed: Option<u64>) -> Self {
        let mut players = Vec::new();
        let mut instance_of: Vec<(SeatKind, usize)> = Vec::new();
        let seats = kinds
            .iter()
            .map(|&kind| {
                if let Some(&(_, index)) = instance_of.iter().find(|(k, _)| *k == kind) {
                    return index;
                }
                let index = players.len();
                players.push(match kind {
                    SeatKind::Search => Player::Search(SearchPlayer::new(config.clone())),
                    SeatKind::Random => Player::Random(match seed {
                        Some(seed) => RandomPlayer::with_seed(seed),
                        None => RandomPlayer::new(),
                    }),
                });
                instance_of.push((kind, index));
                index
            })
            .collect();
        Self { seats, players }
    }

    pub fn seats(&self) -> &[usize] {
        &self.seats
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn play(mut self) -> Result<GameRecord, GameError> {
        play(&self.seats, &mut self.players)
    }
}
