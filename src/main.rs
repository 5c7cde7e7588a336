//! moyo: a parallel Monte-Carlo tree search engine for square-grid
//! territorial board games.
//!
//! ## Usage
//!
//! - `moyo` - Run a short search demo
//! - `moyo gtp` - Start the GTP server for GUI integration
//! - `moyo demo` - Run the MCTS demo explicitly

use std::time::Duration;

use clap::{Parser, Subcommand};

use moyo::config::EngineConfig;
use moyo::gtp::GtpEngine;
use moyo::mcts::{ClockState, SearchConfig, SearchController};
use moyo::position::{parse_coord, play_move, str_coord, Position};

/// moyo: a parallel MCTS engine with a Coulom-style Elo playout policy
#[derive(Parser)]
#[command(name = "moyo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Engine configuration string, e.g. "threads=4,resign_ratio=0.2"
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run a short search demo
    Demo,
}

fn main() {
    let cli = Cli::parse();

    let mut config = EngineConfig::default();
    if let Some(config_str) = &cli.config {
        if let Err(e) = config.apply(config_str) {
            eprintln!("invalid --config: {e}");
            std::process::exit(1);
        }
    }

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::with_config(config);
            engine.run();
        }
        Some(Commands::Demo) | None => {
            run_demo(config);
        }
    }
}

fn run_demo(config: EngineConfig) {
    println!("moyo: parallel Monte-Carlo tree search demo\n");

    let mut pos = Position::new();
    play_move(&mut pos, parse_coord("D4")).unwrap();
    play_move(&mut pos, parse_coord("F6")).unwrap();

    let controller = SearchController::new(
        pos,
        SearchConfig {
            threads: config.threads,
            thread_model: config.thread_model,
            resign_ratio: config.resign_ratio,
            seed: config.force_seed.unwrap_or(1),
        },
    );

    let clock = ClockState {
        main_time_remaining: Duration::from_millis(500),
        byoyomi_time: Duration::ZERO,
        byoyomi_stones_remaining: 0,
    };

    println!("Searching for 500ms...");
    let best_move = controller.genmove(&clock);
    println!("Best move: {}", str_coord(best_move));
}
