//! Quartets from the command line: seat automated players and play a game.

use anyhow::{anyhow, Context};
use clap::Parser;
use quartet_core::Outcome;
use std::thread;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod table;

use args::Cli;
use table::Table;

/// Search recurses once per ply
const GAME_STACK_SIZE: usize = 256 * 1024 * 1024;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    cli.check_seats()?;
    let config = cli.search_config()?;
    info!(seats = ?cli.seats, ?config, "Seating players");

    let table = Table::new(&cli.seats, &config, cli.seed);
    let record = thread::Builder::new()
        .name("game".into())
        .stack_size(GAME_STACK_SIZE)
        .spawn(move || table.play())
        .context("failed to start the game thread")?
        .join()
        .map_err(|_| anyhow!("the game thread panicked"))??;

    if cli.json {
        println!("{}", record.to_json()?);
    } else {
        println!("Final hands: {}", record.final_cards);
        match record.result {
            Outcome::Win(winner) => println!("Win for player {} after {} requests", winner, record.requests()),
            Outcome::Draw => println!("Draw after {} requests", record.requests()),
        }
    }
    Ok(())
}
