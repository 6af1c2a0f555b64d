//! Shakedown: drawing every consequence out of what is known.
//!
//! The rules below are applied until none of them changes anything. Each
//! change pins down an unknown card or rules out a suit for a hand's unknown
//! cards, so the loop always ends. A rule that finds the table impossible
//! stops the shakedown with [`Contradiction`].
//!
//! A suit a hand's unknown cards may still be is an "open" suit: not a void,
//! and not a suit whose four cards are already all known.

use crate::cards::Cards;
use crate::hand::{Hand, Suit, CARDS_PER_SUIT};
use std::collections::BTreeMap;

/// The hands cannot all be true
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Contradiction;

type Progress = Result<bool, Contradiction>;

impl Cards {
    /// Resolve every inference that can be made. Returns false if the hands
    /// are logically inconsistent.
    pub fn shake_down(&mut self) -> bool {
        self.propagate().is_ok()
    }

    fn propagate(&mut self) -> Result<(), Contradiction> {
        loop {
            let totals = self.suit_totals();
            let mut changed = self.apply_suit_rules(&totals)?;
            changed |= self.force_single_open_suit(&totals)?;
            if changed {
                continue;
            }
            if self.fill_sole_unresolved_hand(&totals)? {
                continue;
            }
            if self.apply_capacity_pressure(&totals)? {
                continue;
            }
            if self.apply_shortfall_floor(&totals)? {
                continue;
            }
            if self.close_void_groups(&totals)? {
                continue;
            }
            return Ok(());
        }
    }

    /// Saturation, sole holder and exact fit, suit by suit. Stops at the
    /// first change, since the totals are then stale.
    fn apply_suit_rules(&mut self, totals: &[u8]) -> Progress {
        for (suit, &total) in totals.iter().enumerate() {
            let suit = suit as Suit;
            if total == 0 {
                continue;
            }
            if total > CARDS_PER_SUIT {
                return Err(Contradiction);
            }
            if total == CARDS_PER_SUIT {
                let mut changed = false;
                for hand in &mut self.hands {
                    changed |= hand.exclude(suit);
                }
                if changed {
                    return Ok(true);
                }
                continue;
            }

            let shortfall = CARDS_PER_SUIT - total;
            let eligible: Vec<usize> = self
                .hands
                .iter()
                .enumerate()
                .filter(|(_, hand)| hand.unknown() > 0 && !hand.is_void(suit))
                .map(|(i, _)| i)
                .collect();

            if let [only] = eligible[..] {
                return fill(&mut self.hands[only], suit, shortfall).map(|_| true);
            }

            let slots: u8 = eligible.iter().map(|&i| self.hands[i].unknown()).sum();
            if slots < shortfall {
                return Err(Contradiction);
            }
            if slots == shortfall {
                for &i in &eligible {
                    let unknown = self.hands[i].unknown();
                    fill(&mut self.hands[i], suit, unknown)?;
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// A hand with a single open suit holds only that suit among its unknowns.
    /// Unknown cards with no open suit at all cannot exist.
    fn force_single_open_suit(&mut self, totals: &[u8]) -> Progress {
        let mut changed = false;
        for hand in &mut self.hands {
            if hand.unknown() == 0 {
                continue;
            }
            match open_suits(hand, totals)[..] {
                [] => return Err(Contradiction),
                [suit] => {
                    let unknown = hand.unknown();
                    changed |= hand.fill(suit, unknown);
                }
                _ => {}
            }
        }
        Ok(changed)
    }

    /// If only one hand has unknown cards, they are exactly the cards still
    /// missing from each suit.
    fn fill_sole_unresolved_hand(&mut self, totals: &[u8]) -> Progress {
        let mut unresolved = self.hands.iter_mut().filter(|hand| hand.unknown() > 0);
        let (Some(hand), None) = (unresolved.next(), unresolved.next()) else {
            return Ok(false);
        };
        for (suit, &total) in totals.iter().enumerate() {
            if total < CARDS_PER_SUIT {
                fill(hand, suit as Suit, CARDS_PER_SUIT - total)?;
            }
        }
        if hand.unknown() > 0 {
            return Err(Contradiction);
        }
        Ok(true)
    }

    /// A hand with several unknown cards must take some of a suit when its
    /// other open suits cannot absorb them all.
    fn apply_capacity_pressure(&mut self, totals: &[u8]) -> Progress {
        let mut changed = false;
        for hand in &mut self.hands {
            let unknown = hand.unknown();
            if unknown <= 1 {
                continue;
            }
            let open = open_suits(hand, totals);
            let capacity: u8 = open.iter().map(|&s| CARDS_PER_SUIT - totals[s as usize]).sum();
            if capacity < unknown {
                return Err(Contradiction);
            }
            for &suit in &open {
                let elsewhere = capacity - (CARDS_PER_SUIT - totals[suit as usize]);
                if elsewhere < unknown {
                    fill(hand, suit, unknown - elsewhere)?;
                    changed = true;
                }
            }
        }
        Ok(changed)
    }

    /// A suit with at most two placed cards still needs at least that many
    /// more; a hand whose rivals cannot hold them takes the difference.
    fn apply_shortfall_floor(&mut self, totals: &[u8]) -> Progress {
        let mut changed = false;
        for (suit, &total) in totals.iter().enumerate() {
            let suit = suit as Suit;
            if total == 0 || total > 2 {
                continue;
            }
            let slots: u8 = self
                .hands
                .iter()
                .filter(|hand| !hand.is_void(suit))
                .map(Hand::unknown)
                .sum();
            for hand in &mut self.hands {
                if hand.is_void(suit) {
                    continue;
                }
                let rival_slots = slots - hand.unknown();
                if rival_slots < total {
                    fill(hand, suit, total - rival_slots)?;
                    changed = true;
                }
            }
        }
        Ok(changed)
    }

    /// Hands sharing the same few open suits may have to soak up every
    /// missing card of those suits between them, shutting everyone else out.
    fn close_void_groups(&mut self, totals: &[u8]) -> Progress {
        let n = self.hands.len();
        let mut groups: BTreeMap<Vec<Suit>, Vec<usize>> = BTreeMap::new();
        for (player, hand) in self.hands.iter().enumerate() {
            if hand.unknown() == 0 {
                continue;
            }
            let open = open_suits(hand, totals);
            if open.len() + 2 <= n {
                groups.entry(open).or_default().push(player);
            }
        }

        let mut changed = false;
        for (suits, members) in &groups {
            if members.len() < 2 {
                continue;
            }
            let missing: u8 = suits.iter().map(|&s| CARDS_PER_SUIT - totals[s as usize]).sum();
            let holes: u8 = members.iter().map(|&p| self.hands[p].unknown()).sum();
            if missing < holes {
                return Err(Contradiction);
            }
            if missing == holes {
                for (player, hand) in self.hands.iter_mut().enumerate() {
                    if members.contains(&player) {
                        continue;
                    }
                    for &suit in suits {
                        changed |= hand.exclude(suit);
                    }
                }
            }
        }
        Ok(changed)
    }
}

fn fill(hand: &mut Hand, suit: Suit, count: u8) -> Result<(), Contradiction> {
    if hand.fill(suit, count) {
        Ok(())
    } else {
        Err(Contradiction)
    }
}

fn open_suits(hand: &Hand, totals: &[u8]) -> Vec<Suit> {
    (0..totals.len() as Suit)
        .filter(|&s| !hand.is_void(s) && totals[s as usize] < CARDS_PER_SUIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cards(s: &str) -> Cards {
        s.parse().unwrap()
    }

    fn shaken(s: &str) -> Cards {
        let mut c = cards(s);
        assert!(c.shake_down(), "{} should be consistent", s);
        c
    }

    /// 00???/???: three of the unknowns are 1s, and neither hand can take
    /// more than three 0s, so each holds at least one 1.
    #[test]
    fn test_simple_shake_down() {
        assert_eq!(shaken("00???/???").to_string(), "001??/1??");
    }

    /// 001/0?x1/22211??x0: player 1 cannot hold a 2, since then player 2
    /// would need a 0.
    #[test]
    fn test_shake_down() {
        let c = shaken("001/0?x1/22211??x0");
        assert_eq!(c.hand(0).known_cards(), &BTreeMap::from([(0, 2), (1, 1)]));
        assert_eq!(c.hand(1).known_cards(), &BTreeMap::from([(0, 2)]));
        assert_eq!(c.hand(2).known_cards(), &BTreeMap::from([(1, 3), (2, 4)]));
    }

    /// 000/22?/111???: player 1 asks player 0 for a 1 and must be refused.
    #[test]
    fn test_refusal_then_shake_down() {
        let mut c = cards("000/22?/111???");
        c.refuse(1, 0, 1).unwrap();
        assert!(c.shake_down());
        assert_eq!(c.to_string(), "000/122/011122");
    }

    /// 2211?x0/00??x1/???: player 2 holds at least one 1, because player 1
    /// has none and player 0 has room for only one more.
    #[test]
    fn test_three_player_shake_down() {
        let c = shaken("2211?x0/00??x1/???");
        assert_eq!(c.hand(2).known(1), 1);
    }

    /// 2???/0???x2/????x0: player 2 holds a 1, as at most three 2s fit.
    #[test]
    fn test_three_player_capacity() {
        let c = shaken("2???/0???x2/????x0");
        assert_eq!(c.hand(2).known(1), 1);
    }

    /// 222?x01/111?x23/000?x2/333?x01: players 0 and 3 hold the last 2 and
    /// the last 3 between them, so player 2's unknown card cannot be a 3.
    #[test]
    fn test_four_player_void_groups() {
        let c = shaken("222?x01/111?x23/000?x2/333?x01");
        assert!(c.hand(2).is_void(3));
    }

    /// Player 2 alone has unknown cards, and no 1s or 2s are placed yet.
    #[test]
    fn test_sole_unresolved_hand_takes_the_rest() {
        let c = shaken("0000/-/????????");
        assert_eq!(c.to_string(), "0000/-/11112222");
    }

    #[test]
    fn test_sole_unresolved_hand_that_cannot_fit() {
        let mut c = cards("0011/00??x1");
        assert!(!c.shake_down());
    }

    /// 011?x23/0001/13??x0/22??x01: player 0's unknown card cannot be a 2 or
    /// a 3, and all four 0s and 1s are already placed.
    #[test]
    fn test_unknown_card_with_no_open_suit_is_inconsistent() {
        let mut c = cards("011?x23/0001/13??x0/22??x01");
        assert!(!c.shake_down());

        let mut c = cards("011?x23/0001/13??x0/22??x01");
        assert_eq!(c.test_winner(3), crate::cards::Verdict::Inconsistent);
    }

    #[test]
    fn test_exact_fit_fills_every_slot() {
        let c = shaken("001122/11?/22?");
        assert_eq!(c.to_string(), "001122/011/022");
    }

    #[test]
    fn test_too_few_slots_is_inconsistent() {
        // three 0s are missing but only two cards could be 0s
        let mut c = cards("??????x0/0?/112?");
        assert!(!c.shake_down());
    }

    #[test]
    fn test_shake_down_is_idempotent() {
        for s in [
            "00???/???",
            "001/0?x1/22211??x0",
            "2???/0???x2/????x0",
            "222?x01/111?x23/000?x2/333?x01",
            "0?1?/????/2???",
        ] {
            let once = shaken(s);
            let mut twice = once.clone();
            assert!(twice.shake_down());
            assert_eq!(once, twice, "second shakedown of {} changed it", s);
        }
    }

    #[test]
    fn test_hand_invariants_hold_after_shake_down() {
        for s in ["001/0?x1/22211??x0", "222?x01/1/000??x23/1133??", "0???/????/??x0"] {
            let c = shaken(s);
            for hand in c.hands() {
                assert!(hand.known_cards().values().all(|&count| count > 0));
                assert!(hand.known_voids().iter().all(|s| hand.known(*s) == 0));
                if hand.unknown() == 0 {
                    assert!(hand.known_voids().is_empty());
                }
            }
            assert!(c.suit_totals().iter().all(|&t| t <= CARDS_PER_SUIT));
        }
    }
}
