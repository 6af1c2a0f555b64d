//! A single player's hand, as seen by everybody at the table.
//!
//! Nobody sees anyone's cards, so a hand is a record of what has been
//! deduced about it:
//! - known cards, counted per suit
//! - unknown cards, whose suit has not been pinned down
//! - voids, suits the unknown cards are known not to be
//!
//! Hands have a compact text notation used by logs and tests: one digit per
//! known card, one `?` per unknown card, then optionally `x` followed by the
//! void suits. `22211??x0` is three 2s, two 1s and two unknown cards that are
//! not 0s. An empty hand is written `-`.

use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Suit identifier, in `0..number_of_players`
pub type Suit = u8;

/// Copies of each suit in the pack
pub const CARDS_PER_SUIT: u8 = 4;

/// What is known about one player's hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    /// Known cards per suit; never holds a zero count
    known_cards: BTreeMap<Suit, u8>,
    /// Suits the unknown cards cannot be; empty once nothing is unknown
    known_voids: BTreeSet<Suit>,
    /// Cards whose suit is undetermined
    unknown: u8,
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}

impl Hand {
    /// A hand at the start of the game: four cards, nothing known
    pub fn new() -> Self {
        Self {
            known_cards: BTreeMap::new(),
            known_voids: BTreeSet::new(),
            unknown: CARDS_PER_SUIT,
        }
    }

    /// Build a hand from its parts, checking the hand invariants
    pub fn from_parts(
        known_cards: BTreeMap<Suit, u8>,
        known_voids: BTreeSet<Suit>,
        unknown: u8,
    ) -> Result<Self, GameError> {
        if let Some((suit, count)) = known_cards
            .iter()
            .find(|(_, &count)| count == 0 || count > CARDS_PER_SUIT)
        {
            return Err(GameError::InvalidNotation(format!(
                "{} cards of suit {}",
                count, suit
            )));
        }
        if let Some(suit) = known_voids.iter().find(|s| known_cards.contains_key(s)) {
            return Err(GameError::InvalidNotation(format!(
                "suit {} is both held and void",
                suit
            )));
        }
        if unknown == 0 && !known_voids.is_empty() {
            return Err(GameError::InvalidNotation(
                "voids recorded on a hand with no unknown cards".into(),
            ));
        }
        Ok(Self {
            known_cards,
            known_voids,
            unknown,
        })
    }

    /// No cards at all
    pub fn is_empty(&self) -> bool {
        self.known_cards.is_empty() && self.unknown == 0
    }

    /// Every card in the hand is known
    pub fn is_determined(&self) -> bool {
        self.unknown == 0
    }

    pub fn unknown(&self) -> u8 {
        self.unknown
    }

    /// Number of known cards of this suit
    pub fn known(&self, suit: Suit) -> u8 {
        self.known_cards.get(&suit).copied().unwrap_or(0)
    }

    pub fn known_cards(&self) -> &BTreeMap<Suit, u8> {
        &self.known_cards
    }

    pub fn known_voids(&self) -> &BTreeSet<Suit> {
        &self.known_voids
    }

    pub fn is_void(&self, suit: Suit) -> bool {
        self.known_voids.contains(&suit)
    }

    /// Total cards in the hand, known or not
    pub fn card_count(&self) -> u8 {
        self.known_cards.values().sum::<u8>() + self.unknown
    }

    /// The player has asked for this suit, so must hold one.
    ///
    /// Turns an unknown card into a known one unless a card of the suit is
    /// already known. Returns false if the hand cannot hold the suit.
    pub fn ensure_have(&mut self, suit: Suit) -> bool {
        if self.known_cards.contains_key(&suit) {
            return true;
        }
        if self.known_voids.contains(&suit) || self.unknown == 0 {
            return false;
        }
        self.remove_unknown();
        self.known_cards.insert(suit, 1);
        true
    }

    /// The player has refused a request for this suit.
    ///
    /// Returns false if a card of the suit is known to be held.
    pub fn ensure_have_not(&mut self, suit: Suit) -> bool {
        if self.known_cards.contains_key(&suit) {
            return false;
        }
        if self.unknown > 0 {
            self.known_voids.insert(suit);
        }
        true
    }

    /// Take one card of this suit out of the hand, preferring a known card.
    ///
    /// Returns false if the hand cannot hold the suit.
    pub fn remove(&mut self, suit: Suit) -> bool {
        match self.known_cards.get_mut(&suit) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.known_cards.remove(&suit);
                true
            }
            None => {
                if self.known_voids.contains(&suit) || self.unknown == 0 {
                    return false;
                }
                self.remove_unknown();
                true
            }
        }
    }

    /// Add a known card of this suit
    pub fn add(&mut self, suit: Suit) {
        *self.known_cards.entry(suit).or_insert(0) += 1;
    }

    pub fn has_four_of_a_kind(&self) -> bool {
        self.known_cards
            .values()
            .any(|&count| count >= CARDS_PER_SUIT)
    }

    /// May this player ask for the suit? Only if they hold or might hold one.
    pub fn is_legal(&self, suit: Suit) -> bool {
        if self.known_cards.contains_key(&suit) {
            return true;
        }
        self.unknown > 0 && !self.known_voids.contains(&suit)
    }

    /// Does the hand itself settle whether it holds the suit?
    ///
    /// `Some(answer)` when forced, `None` when it could go either way.
    pub fn has_card(&self, suit: Suit) -> Option<bool> {
        if self.known_cards.contains_key(&suit) {
            Some(true)
        } else if self.unknown == 0 || self.known_voids.contains(&suit) {
            Some(false)
        } else {
            None
        }
    }

    /// Pin `count` unknown cards down as `suit`.
    ///
    /// Returns false when there are not enough unknown cards, or the suit is a
    /// known void.
    pub(crate) fn fill(&mut self, suit: Suit, count: u8) -> bool {
        if count == 0 {
            return true;
        }
        if self.unknown < count || self.known_voids.contains(&suit) {
            return false;
        }
        self.unknown -= count;
        *self.known_cards.entry(suit).or_insert(0) += count;
        if self.unknown == 0 {
            self.known_voids.clear();
        }
        true
    }

    /// Rule out the suit for the unknown cards. Returns true if anything changed.
    pub(crate) fn exclude(&mut self, suit: Suit) -> bool {
        if self.unknown == 0 || self.known_cards.contains_key(&suit) {
            return false;
        }
        self.known_voids.insert(suit)
    }

    fn remove_unknown(&mut self) {
        self.unknown -= 1;
        if self.unknown == 0 {
            self.known_voids.clear();
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (&suit, &count) in &self.known_cards {
            for _ in 0..count {
                write!(f, "{}", suit)?;
            }
        }
        for _ in 0..self.unknown {
            write!(f, "?")?;
        }
        if !self.known_voids.is_empty() {
            write!(f, "x")?;
            for suit in &self.known_voids {
                write!(f, "{}", suit)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Hand {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-" {
            return Self::from_parts(BTreeMap::new(), BTreeSet::new(), 0);
        }
        let (cards, voids) = match s.split_once('x') {
            Some((cards, voids)) => (cards, Some(voids)),
            None => (s, None),
        };

        let too_many = || GameError::InvalidNotation(format!("too many cards in {:?}", s));
        let mut known_cards = BTreeMap::new();
        let mut unknown = 0u8;
        for c in cards.chars() {
            let count = match c {
                '?' => &mut unknown,
                _ => known_cards.entry(suit_digit(c, s)?).or_insert(0u8),
            };
            *count = count.checked_add(1).ok_or_else(too_many)?;
        }

        let mut known_voids = BTreeSet::new();
        for c in voids.unwrap_or_default().chars() {
            known_voids.insert(suit_digit(c, s)?);
        }

        Self::from_parts(known_cards, known_voids, unknown)
    }
}

fn suit_digit(c: char, notation: &str) -> Result<Suit, GameError> {
    c.to_digit(10)
        .map(|d| d as Suit)
        .ok_or_else(|| GameError::InvalidNotation(format!("unexpected {:?} in {:?}", c, notation)))
}
