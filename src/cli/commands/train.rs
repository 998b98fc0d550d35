//! Train command - self-play training for a pair of Q-learning agents

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    cli::output::{format_number, format_rate, print_kv, print_section},
    game::Mark,
    persistence::{self, SavedAgent, TrainingMetadata},
    q_learning::{Hyperparameters, QLearningAgent},
    training::{ProgressObserver, SelfPlayTrainer, TrainingConfig, evaluate_vs_random},
};

#[derive(Parser, Debug)]
#[command(about = "Train a pair of agents through self-play")]
pub struct TrainArgs {
    /// Number of self-play episodes
    #[arg(long, short = 'e', default_value_t = 10_000)]
    pub episodes: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Learning rate α (0.0-1.0)
    #[arg(long, default_value_t = 0.1)]
    pub alpha: f64,

    /// Discount factor γ (0.0-1.0)
    #[arg(long, default_value_t = 0.9)]
    pub gamma: f64,

    /// Initial exploration rate ε
    #[arg(long, default_value_t = 1.0)]
    pub epsilon: f64,

    /// Multiplicative ε decay per episode
    #[arg(long, default_value_t = 0.999)]
    pub epsilon_decay: f64,

    /// Exploration floor
    #[arg(long, default_value_t = 0.01)]
    pub min_epsilon: f64,

    /// Output file for the trained X agent
    #[arg(long)]
    pub out_x: Option<PathBuf>,

    /// Output file for the trained O agent
    #[arg(long)]
    pub out_o: Option<PathBuf>,

    /// Resume from the agents at --out-x/--out-o instead of starting fresh
    #[arg(long, default_value_t = false)]
    pub resume: bool,

    /// Optional path for a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Post-training evaluation games vs a random opponent (0 to skip)
    #[arg(long, default_value_t = 1000)]
    pub eval_games: usize,

    /// Show progress bar (--progress=false to disable)
    #[arg(
        long,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub progress: bool,
}

fn validate_unit_interval(value: f64, flag: &str) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(anyhow!("{flag} must be in [0.0, 1.0], got {value}"))
    }
}

fn load_or_fresh(
    path: Option<&PathBuf>,
    resume: bool,
    mark: Mark,
    hyper: Hyperparameters,
) -> Result<(QLearningAgent, u64)> {
    if resume {
        if let Some(path) = path {
            let saved = persistence::load_from_file(path)
                .with_context(|| format!("failed to resume from {}", path.display()))?;
            if saved.mark() != mark {
                return Err(anyhow!(
                    "agent at {} was trained as {}, expected {mark}",
                    path.display(),
                    saved.mark()
                ));
            }
            let episodes = saved.metadata().episodes_trained;
            return Ok((saved.into_agent(), episodes));
        }
    }
    Ok((QLearningAgent::new(mark, hyper), 0))
}

fn save_agent(
    agent: &QLearningAgent,
    path: &PathBuf,
    episodes_trained: u64,
    seed: Option<u64>,
) -> Result<()> {
    let metadata = TrainingMetadata {
        episodes_trained,
        opponent: "self-play".to_string(),
        saved_at: None,
        seed,
    };
    persistence::save_to_file(&SavedAgent::from_agent(agent, metadata), path)
        .with_context(|| format!("failed to save agent to {}", path.display()))?;
    println!(
        "✓ {} agent saved to: {} ({} Q-values)",
        agent.mark(),
        path.display(),
        format_number(agent.table().len())
    );
    Ok(())
}

pub fn execute(args: TrainArgs) -> Result<()> {
    validate_unit_interval(args.alpha, "--alpha")?;
    validate_unit_interval(args.gamma, "--gamma")?;
    validate_unit_interval(args.epsilon, "--epsilon")?;
    validate_unit_interval(args.epsilon_decay, "--epsilon-decay")?;
    validate_unit_interval(args.min_epsilon, "--min-epsilon")?;

    let hyper = Hyperparameters {
        alpha: args.alpha,
        gamma: args.gamma,
        epsilon: args.epsilon,
        epsilon_decay: args.epsilon_decay,
        min_epsilon: args.min_epsilon,
    };

    let (mut agent_x, prior_x) = load_or_fresh(args.out_x.as_ref(), args.resume, Mark::X, hyper)?;
    let (mut agent_o, prior_o) = load_or_fresh(args.out_o.as_ref(), args.resume, Mark::O, hyper)?;

    print_section("Self-Play Training");
    print_kv("Episodes", &format_number(args.episodes));
    print_kv(
        "Seed",
        &args
            .seed
            .map_or_else(|| "none".to_string(), |s| s.to_string()),
    );
    print_kv("Alpha", &args.alpha.to_string());
    print_kv("Gamma", &args.gamma.to_string());
    print_kv(
        "Epsilon",
        &format!(
            "{} (decay {}, floor {})",
            args.epsilon, args.epsilon_decay, args.min_epsilon
        ),
    );
    if args.resume {
        print_kv("Resumed X episodes", &format_number(prior_x as usize));
        print_kv("Resumed O episodes", &format_number(prior_o as usize));
    }

    let mut trainer = SelfPlayTrainer::new(TrainingConfig {
        episodes: args.episodes,
        seed: args.seed,
    });
    if args.progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }

    let stats = trainer.run(&mut agent_x, &mut agent_o)?;

    print_section("Training Complete");
    print_kv("Episodes", &format_number(stats.episodes));
    print_kv(
        "X wins",
        &format!(
            "{} ({})",
            format_number(stats.x_wins),
            format_rate(stats.win_rate(Mark::X))
        ),
    );
    print_kv(
        "O wins",
        &format!(
            "{} ({})",
            format_number(stats.o_wins),
            format_rate(stats.win_rate(Mark::O))
        ),
    );
    print_kv(
        "Draws",
        &format!(
            "{} ({})",
            format_number(stats.draws),
            format_rate(stats.draw_rate())
        ),
    );
    if stats.faults > 0 {
        print_kv("Faulted episodes", &format_number(stats.faults));
    }
    print_kv("X Q-values", &format_number(agent_x.table().len()));
    print_kv("O Q-values", &format_number(agent_o.table().len()));

    if args.eval_games > 0 {
        let eval_seed = args.seed.map(|s| s.wrapping_add(2));
        let eval = evaluate_vs_random(&mut agent_x, args.eval_games, eval_seed)?;

        print_section("Evaluation vs Random (X, greedy)");
        print_kv("Games", &format_number(eval.episodes));
        print_kv("Win rate", &format_rate(eval.win_rate(Mark::X)));
        print_kv("Draw rate", &format_rate(eval.draw_rate()));
        print_kv("Loss rate", &format_rate(eval.win_rate(Mark::O)));
    }

    let trained = stats.episodes as u64;
    if let Some(path) = &args.out_x {
        save_agent(&agent_x, path, prior_x + trained, args.seed)?;
    }
    if let Some(path) = &args.out_o {
        save_agent(&agent_o, path, prior_o + trained, args.seed)?;
    }

    if let Some(summary_path) = &args.summary {
        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        stats
            .save(summary_path)
            .with_context(|| format!("failed to write summary to {}", summary_path.display()))?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}
