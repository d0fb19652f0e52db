//! Battlenode CLI - generate grids, serve games over stdio and run self-play.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

/// Battlenode - a turn-based grid strategy engine
#[derive(Parser, Debug)]
#[command(name = "battlenode")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a grid and print it
    Generate {
        /// Grid width
        #[arg(long, default_value = "16")]
        width: u16,

        /// Grid height
        #[arg(long, default_value = "16")]
        height: u16,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Players to place on the grid
        #[arg(short, long, default_value = "0")]
        players: usize,

        /// Generation parameters as JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Serve JSON-line requests from stdin, one response per line on stdout
    Play,

    /// Run self-play games between random bots and aggregate statistics
    Simulate {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Bots per game
        #[arg(short, long, default_value = "2")]
        players: usize,

        /// Grid width
        #[arg(long)]
        width: Option<u16>,

        /// Grid height
        #[arg(long)]
        height: Option<u16>,

        /// Maximum ticks per game
        #[arg(short = 't', long)]
        max_turns: Option<u32>,

        /// Generation parameters as JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Generate {
            width,
            height,
            seed,
            players,
            config,
            format,
        } => cli::generate::execute(width, height, seed, players, config, format),

        Commands::Play => cli::play::execute(),

        Commands::Simulate {
            games,
            seed,
            threads,
            players,
            width,
            height,
            max_turns,
            config,
            format,
            progress,
        } => cli::simulate::execute(cli::simulate::SimulateArgs {
            games,
            seed,
            threads,
            players,
            width,
            height,
            max_turns,
            config,
            format,
            progress,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
