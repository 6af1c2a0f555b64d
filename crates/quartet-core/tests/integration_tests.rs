//! Integration tests for the quartet engine.
//!
//! These tests play complete games and check properties of every table
//! reached along the way.

use pretty_assertions::assert_eq;
use quartet_core::*;
use std::collections::{BTreeMap, BTreeSet};
use std::thread;

/// Search recursion goes deep; run it with room to spare
fn with_big_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    thread::Builder::new()
        .stack_size(512 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

fn try_random_game(players: usize, seed: u64) -> Result<GameRecord, GameError> {
    let mut table = vec![
        Player::Random(RandomPlayer::with_seed(seed)),
        Player::Random(RandomPlayer::with_seed(seed + 1)),
    ];
    let seats: Vec<usize> = (0..players).map(|i| i % 2).collect();
    play(&seats, &mut table)
}

fn random_game(players: usize, seed: u64) -> GameRecord {
    try_random_game(players, seed).unwrap()
}

/// Every table a game passed through, after each answer
fn replay(record: &GameRecord) -> Vec<Cards> {
    let mut cards = Cards::new(record.players);
    let mut tables = Vec::new();
    for event in &record.events {
        if let GameEvent::Asked {
            asker,
            holder,
            suit,
            handed,
        } = *event
        {
            if handed {
                cards.transfer(suit, holder, asker).unwrap();
            } else {
                cards.refuse(suit, holder, asker).unwrap();
            }
            assert_ne!(cards.test_winner(asker), Verdict::Inconsistent);
            tables.push(cards.clone());
        }
    }
    tables
}

/// The same table with seats rotated by `shift` and suits renamed by `suits`
fn relabel(cards: &Cards, shift: usize, suits: &[Suit]) -> Cards {
    let n = cards.number_of_players();
    let hands = (0..n)
        .map(|seat| {
            let hand = cards.hand((seat + shift) % n);
            let known: BTreeMap<Suit, u8> = hand
                .known_cards()
                .iter()
                .map(|(&s, &count)| (suits[s as usize], count))
                .collect();
            let voids: BTreeSet<Suit> = hand.known_voids().iter().map(|&s| suits[s as usize]).collect();
            Hand::from_parts(known, voids, hand.unknown()).unwrap()
        })
        .collect();
    Cards::from_hands(hands).unwrap()
}

fn symmetric_key(cards: &Cards, reference: PlayerId) -> Position {
    cards.position_given_permutation(&cards.permutation(reference), reference, true)
}

#[test]
fn test_scripted_game_flow() {
    let mut players = vec![
        Player::Scripted(ScriptedPlayer::new(
            [Request::new(1, 0), Request::new(1, 0), Request::new(1, 0)],
            Vec::<bool>::new(),
        )),
        Player::Scripted(ScriptedPlayer::new(
            [Request::new(0, 1), Request::new(0, 1)],
            [true, true, true],
        )),
    ];
    let record = play(&[0, 1], &mut players).unwrap();
    assert_eq!(record.result, Outcome::Win(0));

    let tables = replay(&record);
    let shown: Vec<String> = tables.iter().map(ToString::to_string).collect();
    assert_eq!(
        shown,
        vec!["001??/1??", "00??/11??", "0001?/11?", "000?/111?", "00001/111"]
    );
}

#[test]
fn test_random_games_finish() {
    for seed in 0..10 {
        for players in 2..=3 {
            let record = random_game(players, seed);
            assert_eq!(record.players, players);
            assert!(record.requests() > 0);
            if let Outcome::Win(winner) = record.result {
                assert!(winner < players);
            }
        }
    }
}

#[test]
fn test_reachable_tables_keep_their_invariants() {
    for seed in 0..5 {
        for table in replay(&random_game(3, seed)) {
            let mut again = table.clone();
            assert!(again.shake_down());
            assert_eq!(again, table, "shakedown of {} is not idempotent", table);

            for hand in table.hands() {
                assert!(hand.known_cards().values().all(|&count| count > 0));
                assert!(hand.known_voids().iter().all(|s| hand.known(*s) == 0));
                if hand.is_determined() {
                    assert!(hand.known_voids().is_empty());
                }
            }
            for suit in 0..table.number_of_players() as Suit {
                let total: u8 = table.hands().iter().map(|h| h.known(suit)).sum();
                assert!(total <= CARDS_PER_SUIT);
            }
        }
    }
}

/// Every table but the last, which may hold four of a kind and is never
/// packed
fn packable(record: &GameRecord) -> Vec<Cards> {
    let mut tables = replay(record);
    tables.pop();
    tables
}

#[test]
fn test_canonical_positions_fold_rotations() {
    for seed in 0..5 {
        for table in packable(&random_game(3, seed)) {
            for shift in 0..3 {
                let other = relabel(&table, shift, &[0, 1, 2]);
                assert_eq!(
                    symmetric_key(&table, shift),
                    symmetric_key(&other, 0),
                    "{} and {} should pack alike",
                    table,
                    other
                );
            }
        }
    }
}

#[test]
fn test_canonical_positions_fold_suit_relabels() {
    let records: Vec<GameRecord> = (0..10).filter_map(|seed| try_random_game(4, seed).ok()).collect();
    assert!(!records.is_empty());
    for record in &records {
        for table in packable(record) {
            for shift in 0..4 {
                for suits in [[0, 1, 2, 3], [3, 0, 1, 2], [1, 0, 3, 2]] {
                    let other = relabel(&table, shift, &suits);
                    assert_eq!(
                        symmetric_key(&table, shift),
                        symmetric_key(&other, 0),
                        "{} and {} should pack alike",
                        table,
                        other
                    );
                }
            }
        }
    }
}

fn search_against_random(seed: u64) -> GameRecord {
    with_big_stack(move || {
        let config = SearchConfig {
            max_depth: 2,
            answer_depth: 0,
            ..SearchConfig::default()
        };
        let mut players = vec![
            Player::Search(SearchPlayer::new(config)),
            Player::Random(RandomPlayer::with_seed(seed)),
        ];
        play(&[0, 1, 0], &mut players).unwrap()
    })
}

#[test]
fn test_search_against_random() {
    let record = search_against_random(5);
    assert_eq!(record.players, 3);
    assert!(record.requests() > 0);
    let mut last = record.final_cards.clone();
    assert_ne!(last.test_winner(0), Verdict::Inconsistent);
}

#[test]
fn test_search_games_repeat_exactly() {
    for seed in [5, 11] {
        assert_eq!(search_against_random(seed), search_against_random(seed));
    }
}

#[test]
fn test_two_search_players_draw() {
    let record = with_big_stack(|| {
        let mut players = vec![Player::Search(SearchPlayer::new(SearchConfig::default()))];
        play(&[0, 0], &mut players).unwrap()
    });
    assert_eq!(record.result, Outcome::Draw);
    assert!(record.requests() >= 2);
}

#[test]
#[ignore = "searches the whole four player game"]
fn test_four_search_players_have_a_fixed_winner() {
    let run = || {
        with_big_stack(|| {
            let mut players = vec![Player::Search(SearchPlayer::new(SearchConfig::default()))];
            play(&[0, 0, 0, 0], &mut players).unwrap()
        })
    };
    let first = run();
    let Outcome::Win(winner) = first.result else {
        panic!("expected a win, got {:?} after {} requests", first.result, first.requests());
    };
    assert!(winner < 4);
    let mut last = first.final_cards.clone();
    assert_eq!(last.test_winner(winner), Verdict::Winner(winner));
    assert_eq!(run(), first);
}

#[test]
#[ignore = "searches the whole three player game"]
fn test_three_search_players_with_preferences() {
    let run = || {
        with_big_stack(|| {
            let prefs = preferences_from_flat(&[2, 0, 1], 3).unwrap();
            let config = SearchConfig::default().with_preferences(prefs);
            assert!(config.symmetric);
            let mut players = vec![Player::Search(SearchPlayer::new(config))];
            play(&[0, 0, 0], &mut players).unwrap()
        })
    };
    let first = run();
    assert!(first.requests() > 0);
    assert_eq!(run(), first);
}
