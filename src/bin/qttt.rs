//! qttt CLI - Tabular Q-learning engine for Tic-Tac-Toe
//!
//! Provides commands for:
//! - Training agent pairs through self-play
//! - Evaluating saved agents against a random opponent

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qttt")]
#[command(version, about = "Tabular Q-learning engine for Tic-Tac-Toe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a pair of agents through self-play
    Train(qttt::cli::commands::train::TrainArgs),

    /// Evaluate a trained agent against a random opponent
    Evaluate(qttt::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qttt::cli::commands::train::execute(args),
        Commands::Evaluate(args) => qttt::cli::commands::evaluate::execute(args),
    }
}
