//! Evaluate command - measure a saved agent against a random opponent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{format_number, format_rate, print_kv, print_section},
    persistence,
    training::evaluate_vs_random,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent against a random opponent")]
pub struct EvaluateArgs {
    /// Path to a saved agent file
    pub agent: PathBuf,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Random seed for the opponent
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export the tally as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let saved = persistence::load_from_file(&args.agent)
        .with_context(|| format!("failed to load agent from {}", args.agent.display()))?;

    print_section("Agent");
    print_kv("File", &args.agent.display().to_string());
    print_kv("Mark", &saved.mark().to_string());
    print_kv(
        "Episodes trained",
        &format_number(saved.metadata().episodes_trained as usize),
    );
    print_kv("Trained against", &saved.metadata().opponent);
    if let Some(seed) = saved.metadata().seed {
        print_kv("Training seed", &seed.to_string());
    }

    let mark = saved.mark();
    let mut agent = saved.into_agent();
    print_kv("Q-values", &format_number(agent.table().len()));

    let stats = evaluate_vs_random(&mut agent, args.games, args.seed)?;

    print_section("Evaluation vs Random (greedy)");
    print_kv("Games", &format_number(stats.episodes));
    print_kv("Win rate", &format_rate(stats.win_rate(mark)));
    print_kv("Draw rate", &format_rate(stats.draw_rate()));
    print_kv("Loss rate", &format_rate(stats.win_rate(mark.opponent())));

    if let Some(export_path) = &args.export {
        stats
            .save(export_path)
            .with_context(|| format!("failed to export tally to {}", export_path.display()))?;
        println!("\nTally written to {}", export_path.display());
    }

    Ok(())
}
