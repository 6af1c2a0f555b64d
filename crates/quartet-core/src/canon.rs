//! Canonical positions, for spotting repeats and sharing cached results.
//!
//! A position packs every hand into one integer, starting with the hand of a
//! reference player and going round the table. Suits are visited in an order
//! derived from the hands themselves, so relabelling the suits of a table
//! gives the same number. Leaving out the reference player's index also makes
//! rotations of the table collide.

use crate::cards::Cards;
use crate::hand::{Hand, Suit, CARDS_PER_SUIT};
use crate::PlayerId;
use rustc_hash::FxHashSet;

/// A table packed into an integer
pub type Position = u128;

/// Positions already seen in a game or along a line of search
pub type History = FxHashSet<Position>;

impl Cards {
    /// Suits ordered by how they appear in the hands, starting from
    /// `reference`: most plentiful in the first hand first, then the next
    /// hand as tie-break, and so on. Ties left at the end keep natural order.
    pub fn permutation(&self, reference: PlayerId) -> Vec<Suit> {
        let n = self.hands.len();
        let mut ranking = vec![0u64; n];
        for hand in self.rotation(reference) {
            adjust_ranking(hand, &mut ranking);
        }
        let mut suits: Vec<Suit> = (0..n as Suit).collect();
        suits.sort_by(|&a, &b| ranking[b as usize].cmp(&ranking[a as usize]));
        suits
    }

    /// The position as it stands, with nothing folded together
    pub fn position(&self, reference: PlayerId) -> Position {
        let identity: Vec<Suit> = (0..self.hands.len() as Suit).collect();
        self.position_given_permutation(&identity, reference, false)
    }

    /// Pack the table visiting suits in `permutation` order.
    ///
    /// With `player_symmetric` the reference player is not encoded, so tables
    /// that are rotations of each other pack to the same number.
    ///
    /// Only tables where nobody holds four of a kind have a position: each
    /// count gets two bits, and a fourth card would spill into the next
    /// field. Such a table is already won and never needs a key.
    pub fn position_given_permutation(
        &self,
        permutation: &[Suit],
        reference: PlayerId,
        player_symmetric: bool,
    ) -> Position {
        let mut pos: Position = 0;
        for hand in self.rotation(reference) {
            pos = pack_hand(hand, pos, permutation);
        }
        if !player_symmetric {
            let n = self.hands.len() as Position;
            pos = pos * n + reference as Position;
        }
        pos
    }

    fn rotation(&self, reference: PlayerId) -> impl Iterator<Item = &Hand> {
        let n = self.hands.len();
        (0..n).map(move |i| &self.hands[(i + reference) % n])
    }
}

/// Each hand scales the running ranking by the number of players, then adds
/// its count and void bit. With fewer than four players a large count can
/// carry into the previous hand's digit; that only costs some sharing.
fn adjust_ranking(hand: &Hand, ranking: &mut [u64]) {
    let n = ranking.len() as u64;
    for (suit, rank) in ranking.iter_mut().enumerate() {
        let suit = suit as Suit;
        *rank = (*rank * n + hand.known(suit) as u64) * 2 + hand.is_void(suit) as u64;
    }
}

/// Only tables with no four of a kind are packed, so counts fit in two bits.
/// Unknown cards only ever decrease from the four dealt.
fn pack_hand(hand: &Hand, mut pos: Position, permutation: &[Suit]) -> Position {
    for &suit in permutation {
        let count = hand.known(suit);
        debug_assert!(count < CARDS_PER_SUIT, "packing a hand holding four {}s", suit);
        pos = pos * 4 + count as Position;
    }
    pos = pos * 8 + hand.unknown() as Position;
    for &suit in permutation {
        pos = pos * 2 + hand.is_void(suit) as Position;
    }
    pos
}
