//! The players that can sit at the table.
//!
//! Every player answers forced questions truthfully; only free choices are
//! left to the player itself.

use crate::actions::Request;
use crate::canon::History;
use crate::cards::Cards;
use crate::error::GameError;
use crate::hand::Suit;
use crate::search::SearchPlayer;
use crate::PlayerId;
use rand::prelude::*;
use std::collections::VecDeque;

/// A player of any kind
#[derive(Debug)]
pub enum Player {
    Random(RandomPlayer),
    Scripted(ScriptedPlayer),
    Search(SearchPlayer),
}

impl Player {
    /// Choose who to ask for what, playing in seat `me`
    pub fn next_move(&mut self, me: PlayerId, cards: &Cards, history: &History) -> Result<Request, GameError> {
        match self {
            Player::Random(p) => p.next_move(me, cards),
            Player::Scripted(p) => p.next_move(me),
            Player::Search(p) => p.next_move(me, cards, history),
        }
    }

    /// Answer `asker`'s request for `suit`, playing in seat `me`
    pub fn has_card(
        &mut self,
        me: PlayerId,
        asker: PlayerId,
        suit: Suit,
        cards: &Cards,
        history: &History,
    ) -> Result<bool, GameError> {
        match self {
            Player::Random(p) => Ok(p.has_card(me, asker, suit, cards)),
            Player::Scripted(p) => p.has_card(me, asker, suit, cards),
            Player::Search(p) => p.has_card(me, asker, suit, cards, history),
        }
    }
}

/// Picks uniformly among the requests worth making, and answers free
/// questions with a coin toss
#[derive(Debug)]
pub struct RandomPlayer {
    rng: StdRng,
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_move(&mut self, me: PlayerId, cards: &Cards) -> Result<Request, GameError> {
        cards
            .legal_moves(me)
            .choose(&mut self.rng)
            .copied()
            .ok_or(GameError::NoLegalMoves { player: me })
    }

    pub fn has_card(&mut self, me: PlayerId, asker: PlayerId, suit: Suit, cards: &Cards) -> bool {
        cards
            .has_card(suit, me, asker)
            .unwrap_or_else(|| self.rng.gen_bool(0.5))
    }
}

/// Replays recorded requests and answers, for tests
#[derive(Debug, Default, Clone)]
pub struct ScriptedPlayer {
    moves: VecDeque<Request>,
    answers: VecDeque<bool>,
}

impl ScriptedPlayer {
    /// `answers` are only consumed by questions that are not forced
    pub fn new(moves: impl IntoIterator<Item = Request>, answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            answers: answers.into_iter().collect(),
        }
    }

    pub fn next_move(&mut self, me: PlayerId) -> Result<Request, GameError> {
        self.moves
            .pop_front()
            .ok_or(GameError::ScriptExhausted { player: me })
    }

    pub fn has_card(&mut self, me: PlayerId, asker: PlayerId, suit: Suit, cards: &Cards) -> Result<bool, GameError> {
        if let Some(forced) = cards.has_card(suit, me, asker) {
            return Ok(forced);
        }
        self.answers
            .pop_front()
            .ok_or(GameError::ScriptExhausted { player: me })
    }

    /// Requests and answers not yet used
    pub fn remaining(&self) -> (usize, usize) {
        (self.moves.len(), self.answers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    #[test]
    fn test_random_player_makes_legal_requests() {
        let cards: Cards = "0???x1/????/????".parse().unwrap();
        let mut player = RandomPlayer::with_seed(7);
        for _ in 0..50 {
            let request = player.next_move(0, &cards).unwrap();
            assert!(cards.legal(0, request.holder, request.suit));
            assert_ne!(request.suit, 1);
        }
    }

    #[test]
    fn test_random_player_is_reproducible() {
        let cards = Cards::new(4);
        let mut a = RandomPlayer::with_seed(42);
        let mut b = RandomPlayer::with_seed(42);
        for _ in 0..20 {
            assert_eq!(a.next_move(1, &cards), b.next_move(1, &cards));
            assert_eq!(a.has_card(1, 0, 2, &cards), b.has_card(1, 0, 2, &cards));
        }
    }

    #[test]
    fn test_random_player_answers_forced_questions() {
        let cards: Cards = "0???/1???x0".parse().unwrap();
        let mut player = RandomPlayer::with_seed(3);
        for _ in 0..20 {
            assert!(player.has_card(1, 0, 1, &cards));
            assert!(!player.has_card(1, 0, 0, &cards));
        }
    }

    #[test]
    fn test_scripted_player_pops_in_order() {
        let cards = Cards::new(2);
        let mut player = ScriptedPlayer::new([Request::new(1, 0), Request::new(1, 1)], [true]);
        assert_eq!(player.next_move(0), Ok(Request::new(1, 0)));
        assert_eq!(player.next_move(0), Ok(Request::new(1, 1)));
        assert_eq!(player.next_move(0), Err(GameError::ScriptExhausted { player: 0 }));

        assert_eq!(player.has_card(0, 1, 0, &cards), Ok(true));
        assert_eq!(
            player.has_card(0, 1, 0, &cards),
            Err(GameError::ScriptExhausted { player: 0 })
        );
    }

    #[test]
    fn test_scripted_player_keeps_answers_for_free_questions() {
        let cards: Cards = "0???/1???x0".parse().unwrap();
        let mut player = ScriptedPlayer::new(Vec::<Request>::new(), [false]);
        assert_eq!(player.has_card(1, 0, 1, &cards), Ok(true));
        assert_eq!(player.remaining(), (0, 1));
    }

    #[test]
    fn test_player_dispatch() {
        let cards: Cards = "000?/111?".parse().unwrap();
        let history = History::default();
        let mut player = Player::Search(SearchPlayer::new(SearchConfig::default()));
        assert_eq!(player.next_move(0, &cards, &history), Ok(Request::new(1, 0)));

        let mut player = Player::Scripted(ScriptedPlayer::new([Request::new(1, 1)], Vec::<bool>::new()));
        assert_eq!(player.next_move(0, &cards, &history), Ok(Request::new(1, 1)));
        assert_eq!(player.has_card(1, 0, 1, &cards, &history), Ok(true));
    }
}
