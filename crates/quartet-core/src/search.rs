//! Lookahead search for requests and answers.
//!
//! [`SearchPlayer::evaluate_move`] tries every request worth making, decides
//! how the holder would answer with [`SearchPlayer::decide_has_card`], and
//! follows the game down until someone wins, a position repeats or the depth
//! budget runs out. Results are cached by canonical position, relative to the
//! player to move, so one entry serves every seat and every relabelling of
//! the suits.

use crate::actions::Request;
use crate::canon::{History, Position};
use crate::cards::{Cards, Verdict};
use crate::config::SearchConfig;
use crate::error::GameError;
use crate::hand::Suit;
use crate::PlayerId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Best result a line of play can be forced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win(PlayerId),
    Draw,
}

/// A chosen request and where it leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub request: Request,
    pub outcome: Outcome,
    /// For a draw, the position whose repetition caused it
    pub repeated: Option<Position>,
}

impl Evaluation {
    fn new(request: Request, outcome: Outcome, repeated: Option<Position>) -> Self {
        Self {
            request,
            outcome,
            repeated,
        }
    }
}

/// An outcome with the winner counted in seats after the player to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeOutcome {
    Win(u8),
    Draw,
}

/// A cached best request, relative to the player to move and the suit
/// permutation the position was packed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedMove {
    holder: u8,
    suit: u8,
    outcome: RelativeOutcome,
}

/// Transposition cache, shared by every seat a search player sits in
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: FxHashMap<Position, CachedMove>,
}

impl SearchCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: Position, me: PlayerId, permutation: &[Suit]) -> Option<Evaluation> {
        let cached = self.entries.get(&key)?;
        let n = permutation.len();
        let holder = (cached.holder as usize + me) % n;
        let suit = *permutation.get(cached.suit as usize)?;
        let outcome = match cached.outcome {
            RelativeOutcome::Win(offset) => Outcome::Win((offset as usize + me) % n),
            RelativeOutcome::Draw => Outcome::Draw,
        };
        Some(Evaluation::new(Request { holder, suit }, outcome, None))
    }

    fn store(&mut self, key: Position, me: PlayerId, permutation: &[Suit], eval: &Evaluation) {
        let n = permutation.len();
        let Some(suit) = permutation.iter().position(|&s| s == eval.request.suit) else {
            return;
        };
        let outcome = match eval.outcome {
            Outcome::Win(winner) => RelativeOutcome::Win(((n + winner - me) % n) as u8),
            Outcome::Draw => RelativeOutcome::Draw,
        };
        self.entries.insert(
            key,
            CachedMove {
                holder: ((n + eval.request.holder - me) % n) as u8,
                suit: suit as u8,
                outcome,
            },
        );
    }
}

/// Candidate requests sorted by how they turned out
#[derive(Debug, Default)]
struct Candidates {
    draw: Option<Evaluation>,
    /// Wins for players the mover would like to see win, by rank
    preferred: Vec<Option<Evaluation>>,
    loss: Option<Evaluation>,
    truncated: Option<Evaluation>,
    immediate_loss: Option<Evaluation>,
}

impl Candidates {
    fn new(preferences: usize) -> Self {
        Self {
            preferred: vec![None; preferences],
            ..Self::default()
        }
    }

    fn record_loss(&mut self, rank: Option<usize>, immediate: bool, eval: Evaluation) {
        match rank {
            Some(rank) => self.preferred[rank] = Some(eval),
            None if immediate => self.immediate_loss = Some(eval),
            None => self.loss = Some(eval),
        }
    }

    /// Draw, then a preferred winner, then a loss, then an unexplored line,
    /// and only then an immediate loss
    fn resolve(self) -> Option<Evaluation> {
        let Candidates {
            draw,
            preferred,
            loss,
            truncated,
            immediate_loss,
        } = self;
        draw.or_else(|| preferred.into_iter().flatten().next())
            .or(loss)
            .or(truncated)
            .or(immediate_loss)
    }
}

/// What follows from one answer to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerOutcome {
    /// The answer contradicts what is known
    Impossible,
    /// Someone wins as soon as the answer is given
    Immediate(PlayerId),
    /// Where the game goes from there
    Eventual(Outcome),
    /// Out of depth before anything was decided
    Unexplored,
}

/// A player that searches the game tree
#[derive(Debug, Default)]
pub struct SearchPlayer {
    config: SearchConfig,
    cache: SearchCache,
}

impl SearchPlayer {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cache: SearchCache::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Choose a request for `me`, searching `max_depth` plies
    pub fn next_move(&mut self, me: PlayerId, cards: &Cards, history: &History) -> Result<Request, GameError> {
        let eval = self.evaluate_move(me, cards, history, self.config.max_depth)?;
        debug!(
            player = me,
            holder = eval.request.holder,
            suit = eval.request.suit,
            outcome = ?eval.outcome,
            cache = self.cache.len(),
            "search chose request"
        );
        Ok(eval.request)
    }

    /// Answer `asker`'s request for `suit`, searching `answer_depth` plies
    pub fn has_card(
        &mut self,
        holder: PlayerId,
        asker: PlayerId,
        suit: Suit,
        cards: &Cards,
        history: &History,
    ) -> Result<bool, GameError> {
        let depth = self.config.answer_depth;
        self.decide_has_card(holder, asker, suit, cards, history, depth)
    }

    /// The best request for `me` and what it leads to.
    ///
    /// `history` holds the positions already reached in this line of play,
    /// including the current one.
    pub fn evaluate_move(
        &mut self,
        me: PlayerId,
        cards: &Cards,
        history: &History,
        depth: u32,
    ) -> Result<Evaluation, GameError> {
        let permutation = cards.permutation(me);
        let key = cards.position_given_permutation(&permutation, me, self.config.symmetric);
        if let Some(eval) = self.cache.lookup(key, me, &permutation) {
            return Ok(eval);
        }

        let eval = self.evaluate_uncached(me, cards, history, depth, &permutation)?;
        // A draw forced by repeating a position from before this search
        // only holds for this history.
        let cacheable = matches!(eval.outcome, Outcome::Win(_))
            || eval.repeated.map_or(true, |pos| !history.contains(&pos));
        if cacheable {
            self.cache.store(key, me, &permutation, &eval);
        }
        Ok(eval)
    }

    fn evaluate_uncached(
        &mut self,
        me: PlayerId,
        cards: &Cards,
        history: &History,
        depth: u32,
        permutation: &[Suit],
    ) -> Result<Evaluation, GameError> {
        let moves = cards.legal_moves_given_permutation(me, permutation);
        let mut candidates = Candidates::new(self.config.preference_len(me));

        for request in moves {
            let Request { holder, suit } = request;
            let answer_depth = self.config.answer_depth;
            let handed = self.decide_has_card(holder, me, suit, cards, history, answer_depth)?;

            let mut next = cards.clone();
            let applied = if handed {
                next.transfer(suit, holder, me)
            } else {
                next.refuse(suit, holder, me)
            };
            if let Err(err) = applied {
                warn!(player = me, holder, suit, handed, %err, "candidate request cannot be applied");
                continue;
            }

            match next.test_winner(me) {
                Verdict::Inconsistent => {
                    warn!(player = me, holder, suit, handed, cards = %next, "candidate request leaves inconsistent cards");
                    continue;
                }
                Verdict::Winner(winner) if winner == me => {
                    return Ok(Evaluation::new(request, Outcome::Win(me), None));
                }
                Verdict::Winner(winner) => {
                    let rank = self.config.preference_rank(me, winner);
                    candidates.record_loss(rank, true, Evaluation::new(request, Outcome::Win(winner), None));
                    continue;
                }
                Verdict::NoWinnerYet => {}
            }

            let mover = next.next_player(me)?;
            let pos = next.position(mover);
            if history.contains(&pos) {
                candidates.draw = Some(Evaluation::new(request, Outcome::Draw, Some(pos)));
                continue;
            }
            if depth == 0 {
                candidates.truncated = Some(Evaluation::new(request, Outcome::Draw, None));
                continue;
            }

            let mut deeper = history.clone();
            deeper.insert(pos);
            let reply = self.evaluate_move(mover, &next, &deeper, depth - 1)?;
            match reply.outcome {
                Outcome::Win(winner) if winner == me => {
                    return Ok(Evaluation::new(request, reply.outcome, None));
                }
                Outcome::Win(winner) => {
                    let rank = self.config.preference_rank(me, winner);
                    candidates.record_loss(rank, false, Evaluation::new(request, reply.outcome, None));
                }
                Outcome::Draw => {
                    candidates.draw = Some(Evaluation::new(request, Outcome::Draw, reply.repeated));
                }
            }
        }

        candidates.resolve().ok_or(GameError::NoLegalMoves { player: me })
    }

    /// Should `holder` admit to having a `suit` when `asker` asks?
    ///
    /// Forced answers are given as they are. Otherwise both answers are
    /// played out and ranked from the holder's point of view: a win for the
    /// holder, then a draw, then another player's eventual win, then another
    /// player's immediate win, preferred winners first. Ties answer no.
    ///
    /// Requests inside the search are answered with the configured
    /// `answer_depth`, whatever depth the request search has reached. Each
    /// unforced answer adds knowledge to the table, so the nesting ends.
    pub fn decide_has_card(
        &mut self,
        holder: PlayerId,
        asker: PlayerId,
        suit: Suit,
        cards: &Cards,
        history: &History,
        depth: u32,
    ) -> Result<bool, GameError> {
        if let Some(forced) = cards.has_card(suit, holder, asker) {
            return Ok(forced);
        }

        let yes = self.answer_outcome(holder, asker, suit, true, cards, history, depth)?;
        if depth == 0 {
            let hands_someone_the_game =
                matches!(yes, AnswerOutcome::Immediate(winner) if winner != holder);
            if !hands_someone_the_game && yes != AnswerOutcome::Impossible {
                return Ok(true);
            }
        }
        let no = self.answer_outcome(holder, asker, suit, false, cards, history, depth)?;
        Ok(self.answer_rank(holder, yes) < self.answer_rank(holder, no))
    }

    #[allow(clippy::too_many_arguments)]
    fn answer_outcome(
        &mut self,
        holder: PlayerId,
        asker: PlayerId,
        suit: Suit,
        handed: bool,
        cards: &Cards,
        history: &History,
        depth: u32,
    ) -> Result<AnswerOutcome, GameError> {
        let mut next = cards.clone();
        let applied = if handed {
            next.transfer(suit, holder, asker)
        } else {
            next.refuse(suit, holder, asker)
        };
        if applied.is_err() {
            return Ok(AnswerOutcome::Impossible);
        }
        match next.test_winner(asker) {
            Verdict::Inconsistent => return Ok(AnswerOutcome::Impossible),
            Verdict::Winner(winner) => return Ok(AnswerOutcome::Immediate(winner)),
            Verdict::NoWinnerYet => {}
        }
        if depth == 0 {
            return Ok(AnswerOutcome::Unexplored);
        }

        let mover = next.next_player(asker)?;
        let reply = self.evaluate_move(mover, &next, history, depth - 1)?;
        Ok(AnswerOutcome::Eventual(reply.outcome))
    }

    /// Lower is better for `holder`
    fn answer_rank(&self, holder: PlayerId, outcome: AnswerOutcome) -> usize {
        let listed = self.config.preference_len(holder);
        let preference = |winner| self.config.preference_rank(holder, winner).unwrap_or(listed);
        match outcome {
            AnswerOutcome::Immediate(winner) | AnswerOutcome::Eventual(Outcome::Win(winner))
                if winner == holder =>
            {
                0
            }
            AnswerOutcome::Eventual(Outcome::Draw) | AnswerOutcome::Unexplored => 1,
            AnswerOutcome::Eventual(Outcome::Win(winner)) => 2 + preference(winner),
            AnswerOutcome::Immediate(winner) => 2 + (listed + 1) + preference(winner),
            AnswerOutcome::Impossible => usize::MAX,
        }
    }
}
