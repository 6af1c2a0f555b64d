//! Search settings.

use crate::error::GameError;
use crate::PlayerId;
use serde::{Deserialize, Serialize};

/// How a search player looks ahead
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched when choosing a request
    pub max_depth: u32,
    /// Plies searched when deciding how to answer a request
    pub answer_depth: u32,
    /// For each player, the other players they would rather see win, most
    /// preferred first. Empty when nobody has a preference.
    pub preferences: Vec<Vec<PlayerId>>,
    /// Share cached results between rotations of the table. Only sound when
    /// the preferences look the same from every seat.
    pub symmetric: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            answer_depth: 1000,
            preferences: Vec::new(),
            symmetric: true,
        }
    }
}

impl SearchConfig {
    /// Set preferences, turning off symmetry if they are not rotation symmetric
    pub fn with_preferences(mut self, preferences: Vec<Vec<PlayerId>>) -> Self {
        self.symmetric = is_rotation_symmetric(&preferences);
        self.preferences = preferences;
        self
    }

    /// Where `winner` ranks among `player`'s preferences, if listed
    pub fn preference_rank(&self, player: PlayerId, winner: PlayerId) -> Option<usize> {
        self.preferences
            .get(player)?
            .iter()
            .position(|&p| p == winner)
    }

    /// Length of `player`'s preference list
    pub fn preference_len(&self, player: PlayerId) -> usize {
        self.preferences.get(player).map_or(0, Vec::len)
    }
}

/// Split a flat list into one preference list per player.
///
/// Each of the `players` players ranks every other player except the one
/// they would least like to win, so the list holds `players * (players - 2)`
/// entries.
pub fn preferences_from_flat(flat: &[PlayerId], players: usize) -> Result<Vec<Vec<PlayerId>>, GameError> {
    if players < 3 {
        return Err(GameError::InvalidPreferences(format!(
            "preferences need at least 3 players, got {}",
            players
        )));
    }
    let per_player = players - 2;
    if flat.len() != players * per_player {
        return Err(GameError::InvalidPreferences(format!(
            "{} entries given, {} players need {}",
            flat.len(),
            players,
            players * per_player
        )));
    }
    let prefs: Vec<Vec<PlayerId>> = flat.chunks(per_player).map(<[_]>::to_vec).collect();
    for (player, list) in prefs.iter().enumerate() {
        if let Some(&bad) = list.iter().find(|&&p| p >= players || p == player) {
            return Err(GameError::InvalidPreferences(format!(
                "player {} cannot prefer player {}",
                player, bad
            )));
        }
    }
    Ok(prefs)
}

/// Does every player's list equal player 0's, rotated round the table?
pub fn is_rotation_symmetric(preferences: &[Vec<PlayerId>]) -> bool {
    let n = preferences.len();
    let Some(first) = preferences.first() else {
        return true;
    };
    preferences.iter().enumerate().all(|(i, list)| {
        list.len() == first.len() && list.iter().zip(first).all(|(&p, &p0)| p == (p0 + i) % n)
    })
}
