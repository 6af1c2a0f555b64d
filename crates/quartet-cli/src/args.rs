//! Command line arguments.

use clap::{Parser, ValueEnum};
use quartet_core::{is_rotation_symmetric, preferences_from_flat, GameError, PlayerId, SearchConfig, MAX_PLAYERS};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("Need 2-{max} seats, got {got}")]
    SeatCount { got: usize, max: usize },

    #[error("Cannot read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Config file gives preferences for {got} players, the table has {seats}")]
    PreferenceCount { got: usize, seats: usize },

    #[error(transparent)]
    Preferences(#[from] GameError),
}

/// Who sits in a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeatKind {
    /// Looks ahead to find the best request and answer
    Search,
    /// Picks requests and answers at random
    Random,
}

/// Play a game of quartets between automated players.
#[derive(Debug, Parser)]
#[command(name = "quartet", version, about = "Quartets deduction engine")]
pub struct Cli {
    /// Plies searched when choosing a request [default: 1000]
    #[arg(long, value_name = "PLIES")]
    pub max_depth: Option<u32>,

    /// Plies searched when deciding how to answer [default: 1000]
    #[arg(long, value_name = "PLIES")]
    pub answer_depth: Option<u32>,

    /// Preferred winners for every player in turn, flattened: each player
    /// lists all the others but one, most preferred first.
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub prefs: Option<Vec<PlayerId>>,

    /// Seed for random players.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// JSON file with search settings; flags override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the whole game record as JSON.
    #[arg(long)]
    pub json: bool,

    /// The players, one per seat.
    #[arg(value_enum, required = true, value_name = "SEAT")]
    pub seats: Vec<SeatKind>,
}

impl Cli {
    pub fn check_seats(&self) -> Result<(), ArgsError> {
        let got = self.seats.len();
        if !(2..=MAX_PLAYERS).contains(&got) {
            return Err(ArgsError::SeatCount { got, max: MAX_PLAYERS });
        }
        Ok(())
    }

    /// Settings from the config file, if any, with flags applied on top
    pub fn search_config(&self) -> Result<SearchConfig, ArgsError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SearchConfig::default(),
        };
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(depth) = self.answer_depth {
            config.answer_depth = depth;
        }

        let seats = self.seats.len();
        if let Some(flat) = &self.prefs {
            config = config.with_preferences(preferences_from_flat(flat, seats)?);
        } else if !config.preferences.is_empty() {
            if config.preferences.len() != seats {
                return Err(ArgsError::PreferenceCount {
                    got: config.preferences.len(),
                    seats,
                });
            }
            config.symmetric &= is_rotation_symmetric(&config.preferences);
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<SearchConfig, ArgsError> {
    let text = std::fs::read_to_string(path).map_err(|source| ArgsError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArgsError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("quartet").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_seats_and_flags() {
        let cli = parse(&["--max-depth", "4", "--seed", "9", "search", "random", "search"]);
        assert_eq!(cli.seats, vec![SeatKind::Search, SeatKind::Random, SeatKind::Search]);
        assert_eq!(cli.seed, Some(9));
        let config = cli.search_config().unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.answer_depth, 1000);
    }

    #[test]
    fn test_seat_count() {
        assert!(parse(&["search", "search"]).check_seats().is_ok());
        assert!(matches!(
            parse(&["search"]).check_seats(),
            Err(ArgsError::SeatCount { got: 1, .. })
        ));
        assert!(parse(&["random"; 6]).check_seats().is_err());
        assert!(Cli::try_parse_from(["quartet"]).is_err());
        assert!(Cli::try_parse_from(["quartet", "human", "search"]).is_err());
    }

    #[test]
    fn test_prefs() {
        let config = parse(&["--prefs", "1,2,0", "search", "search", "search"])
            .search_config()
            .unwrap();
        assert_eq!(config.preferences, vec![vec![1], vec![2], vec![0]]);
        assert!(config.symmetric);

        let config = parse(&["--prefs", "1,0,0", "search", "search", "search"])
            .search_config()
            .unwrap();
        assert!(!config.symmetric);

        assert!(parse(&["--prefs", "1,2", "search", "search", "search"])
            .search_config()
            .is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let cli = parse(&["--config", "/nonexistent/quartet.json", "search", "search"]);
        assert!(matches!(cli.search_config(), Err(ArgsError::ConfigRead { .. })));
    }
}
