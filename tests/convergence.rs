//! Convergence check: a trained X agent dominates a random opponent

use qttt::{
    Hyperparameters, Mark, QLearningAgent, SelfPlayTrainer, TrainingConfig,
    training::evaluate_vs_random,
};

#[test]
fn trained_x_agent_beats_random_play() {
    let hyper = Hyperparameters::default();
    let mut agent_x = QLearningAgent::new(Mark::X, hyper);
    let mut agent_o = QLearningAgent::new(Mark::O, hyper);

    let mut trainer = SelfPlayTrainer::new(TrainingConfig {
        episodes: 30_000,
        seed: Some(42),
    });
    trainer
        .run(&mut agent_x, &mut agent_o)
        .expect("training runs");

    let stats = evaluate_vs_random(&mut agent_x, 1000, Some(99)).expect("evaluation runs");

    let win_rate = stats.win_rate(Mark::X);
    let loss_rate = stats.win_rate(Mark::O);
    assert!(
        win_rate >= 0.85,
        "expected win rate >= 85% vs random, got {:.1}%",
        win_rate * 100.0
    );
    assert!(
        loss_rate <= 0.05,
        "expected loss rate <= 5% vs random, got {:.1}%",
        loss_rate * 100.0
    );
}

#[test]
fn training_shifts_outcomes_toward_first_player_strength() {
    // Baseline: an untrained greedy X falls back to lowest-index play.
    // Self-play training should clear that bar by a wide margin.
    let hyper = Hyperparameters::default();
    let mut fresh = QLearningAgent::new(Mark::X, hyper);
    let baseline = evaluate_vs_random(&mut fresh, 1000, Some(3)).expect("evaluation runs");

    let mut agent_x = QLearningAgent::new(Mark::X, hyper);
    let mut agent_o = QLearningAgent::new(Mark::O, hyper);
    let mut trainer = SelfPlayTrainer::new(TrainingConfig {
        episodes: 30_000,
        seed: Some(8),
    });
    trainer
        .run(&mut agent_x, &mut agent_o)
        .expect("training runs");
    let trained = evaluate_vs_random(&mut agent_x, 1000, Some(3)).expect("evaluation runs");

    assert!(
        trained.win_rate(Mark::X) > baseline.win_rate(Mark::X),
        "training should beat the greedy-untrained baseline ({:.1}% vs {:.1}%)",
        trained.win_rate(Mark::X) * 100.0,
        baseline.win_rate(Mark::X) * 100.0
    );
}
