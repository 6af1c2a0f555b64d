//! The whole table: one [`Hand`] per player.
//!
//! There are as many suits as players and four cards of each suit, so every
//! hand starts as four unknown cards. Requests and refusals move cards and add
//! knowledge; [`Cards::shake_down`] (see `propagate`) draws the consequences.

use crate::actions::Request;
use crate::error::GameError;
use crate::hand::{Hand, Suit, CARDS_PER_SUIT};
use crate::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Most players the engine supports; canonical positions must fit in 128 bits
pub const MAX_PLAYERS: usize = 5;

/// Result of checking the table for a winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Winner(PlayerId),
    NoWinnerYet,
    /// The hands cannot all be true at once
    Inconsistent,
}

/// The pack, split between the players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cards {
    pub(crate) hands: Vec<Hand>,
}

impl Cards {
    /// Deal a new game: every player holds four unknown cards
    pub fn new(number_of_players: usize) -> Self {
        assert!(
            (2..=MAX_PLAYERS).contains(&number_of_players),
            "Must have 2-{} players",
            MAX_PLAYERS
        );
        Self {
            hands: (0..number_of_players).map(|_| Hand::new()).collect(),
        }
    }

    /// Build a table from explicit hands
    pub fn from_hands(hands: Vec<Hand>) -> Result<Self, GameError> {
        let n = hands.len();
        if !(2..=MAX_PLAYERS).contains(&n) {
            return Err(GameError::InvalidNotation(format!(
                "{} hands, expected 2-{}",
                n, MAX_PLAYERS
            )));
        }
        for hand in &hands {
            let out_of_range = hand
                .known_cards()
                .keys()
                .chain(hand.known_voids())
                .any(|&suit| suit as usize >= n);
            if out_of_range {
                return Err(GameError::InvalidNotation(format!(
                    "hand {} uses a suit beyond {}",
                    hand,
                    n - 1
                )));
            }
        }
        Ok(Self { hands })
    }

    pub fn number_of_players(&self) -> usize {
        self.hands.len()
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand(&self, player: PlayerId) -> &Hand {
        &self.hands[player]
    }

    pub fn is_empty(&self, player: PlayerId) -> bool {
        self.hands[player].is_empty()
    }

    /// Record a successful request: `holder` hands a card of `suit` to `asker`.
    ///
    /// Fails if the asker cannot have asked, or the holder cannot have one.
    /// Speculative callers treat failure as a pruned branch; on failure the
    /// table is left part-way updated and should be discarded.
    pub fn transfer(&mut self, suit: Suit, holder: PlayerId, asker: PlayerId) -> Result<(), GameError> {
        if !self.hands[asker].ensure_have(suit) {
            return Err(GameError::IllegalRequest { player: asker, suit });
        }
        if !self.hands[holder].remove(suit) {
            return Err(GameError::ContradictoryAnswer { player: holder, suit });
        }
        self.hands[asker].add(suit);
        Ok(())
    }

    /// Record a refusal: `holder` has no card of `suit` for `asker`.
    pub fn refuse(&mut self, suit: Suit, holder: PlayerId, asker: PlayerId) -> Result<(), GameError> {
        if !self.hands[asker].ensure_have(suit) {
            return Err(GameError::IllegalRequest { player: asker, suit });
        }
        if !self.hands[holder].ensure_have_not(suit) {
            return Err(GameError::ContradictoryAnswer { player: holder, suit });
        }
        Ok(())
    }

    /// Is there a winner after `last_player`'s request?
    ///
    /// Shakes the table down first. A table with nothing left unknown is a
    /// win for `last_player`, who forced it, whoever holds four of a kind.
    /// Otherwise four of a kind wins, looking at players in turn from
    /// `last_player`.
    pub fn test_winner(&mut self, last_player: PlayerId) -> Verdict {
        if !self.shake_down() {
            return Verdict::Inconsistent;
        }
        if self.hands.iter().all(Hand::is_determined) {
            return Verdict::Winner(last_player);
        }
        let n = self.hands.len();
        match (0..n)
            .map(|i| (i + last_player) % n)
            .find(|&p| self.hands[p].has_four_of_a_kind())
        {
            Some(winner) => Verdict::Winner(winner),
            None => Verdict::NoWinnerYet,
        }
    }

    /// May `asker` ask `holder` for `suit`?
    pub fn legal(&self, asker: PlayerId, holder: PlayerId, suit: Suit) -> bool {
        let n = self.hands.len();
        asker != holder
            && asker < n
            && holder < n
            && (suit as usize) < n
            && self.hands[asker].is_legal(suit)
    }

    /// Requests worth making, suits in natural order
    pub fn legal_moves(&self, asker: PlayerId) -> Vec<Request> {
        let identity: Vec<Suit> = (0..self.hands.len() as Suit).collect();
        self.legal_moves_given_permutation(asker, &identity)
    }

    /// Requests worth making, suits taken in `permutation` order and holders
    /// in turn order after the asker.
    ///
    /// Holders known not to have the suit are skipped, as are requests for a
    /// suit that would already be fully placed once the asker's own card of
    /// it is counted.
    pub fn legal_moves_given_permutation(&self, asker: PlayerId, permutation: &[Suit]) -> Vec<Request> {
        let asker_hand = &self.hands[asker];
        let suits: Vec<Suit> = permutation
            .iter()
            .copied()
            .filter(|&s| asker_hand.is_legal(s))
            .collect();
        let totals = self.suit_totals();
        let n = self.hands.len();

        let mut moves = Vec::new();
        for holder in (1..n).map(|i| (i + asker) % n) {
            for &suit in &suits {
                match self.hands[holder].has_card(suit) {
                    Some(false) => continue,
                    Some(true) => {}
                    None => {
                        let mut placed = totals[suit as usize];
                        if asker_hand.known(suit) == 0 {
                            placed += 1;
                        }
                        if placed >= CARDS_PER_SUIT {
                            continue;
                        }
                    }
                }
                moves.push(Request { holder, suit });
            }
        }
        moves
    }

    /// Must `holder` answer a request from `asker` for `suit` one way?
    ///
    /// `Some(answer)` when either the holder's hand settles it or one of the
    /// two answers leaves the table inconsistent; `None` when both are open.
    pub fn has_card(&self, suit: Suit, holder: PlayerId, asker: PlayerId) -> Option<bool> {
        if let Some(forced) = self.hands[holder].has_card(suit) {
            return Some(forced);
        }
        let mut refused = self.clone();
        if refused.refuse(suit, holder, asker).is_err() || !refused.shake_down() {
            return Some(true);
        }
        let mut handed = self.clone();
        if handed.transfer(suit, holder, asker).is_err() || !handed.shake_down() {
            return Some(false);
        }
        None
    }

    /// The next player after `player` who still holds cards
    pub fn next_player(&self, player: PlayerId) -> Result<PlayerId, GameError> {
        let n = self.hands.len();
        (1..=n)
            .map(|i| (player + i) % n)
            .find(|&p| !self.hands[p].is_empty())
            .ok_or(GameError::ExhaustedPlayers)
    }

    /// Known cards of each suit, summed over all hands
    pub(crate) fn suit_totals(&self) -> Vec<u8> {
        let mut totals = vec![0u8; self.hands.len()];
        for hand in &self.hands {
            for (&suit, &count) in hand.known_cards() {
                if let Some(total) = totals.get_mut(suit as usize) {
                    *total += count;
                }
            }
        }
        totals
    }
}

impl fmt::Display for Cards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hand) in self.hands.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", hand)?;
        }
        Ok(())
    }
}

impl FromStr for Cards {
    type Err = GameError;

    /// Hands in [`Hand`] notation separated by `/`, e.g. `001/0?x1/22211??x0`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hands = s
            .split('/')
            .map(str::parse)
            .collect::<Result<Vec<Hand>, _>>()?;
        Self::from_hands(hands)
    }
}
