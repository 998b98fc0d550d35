//! Self-play training loop for a pair of Q-learning agents

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    game::{BoardState, Mark, Outcome},
    q_learning::QLearningAgent,
    training::observers::Observer,
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of self-play episodes
    pub episodes: usize,

    /// Random seed; the O agent is seeded with `seed + 1`
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 10_000,
            seed: None,
        }
    }
}

/// Tally of a training or evaluation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Episodes actually completed
    pub episodes: usize,

    /// Games won by X
    pub x_wins: usize,

    /// Games won by O
    pub o_wins: usize,

    /// Drawn games
    pub draws: usize,

    /// Episodes abandoned because of an internal error
    pub faults: usize,
}

impl TrainingStats {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        self.episodes += 1;
        match outcome {
            Outcome::Win(Mark::X) => self.x_wins += 1,
            Outcome::Win(Mark::O) => self.o_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Fraction of completed episodes won by `mark`
    pub fn win_rate(&self, mark: Mark) -> f64 {
        let wins = match mark {
            Mark::X => self.x_wins,
            Mark::O => self.o_wins,
        };
        if self.episodes == 0 {
            0.0
        } else {
            wins as f64 / self.episodes as f64
        }
    }

    /// Fraction of completed episodes that were drawn
    pub fn draw_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.draws as f64 / self.episodes as f64
        }
    }

    /// Save stats to a JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load stats from a JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let stats = serde_json::from_reader(file)?;
        Ok(stats)
    }
}

/// Self-play driver for two Q-learning agents
///
/// Every episode starts from the empty board with X to move. Updates are
/// applied step-wise as moves are taken; at episode end the winner's final
/// transition receives the +1 terminal target and the loser's pending
/// transition is re-targeted with −1 (draws pay 0 to both).
pub struct SelfPlayTrainer {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl SelfPlayTrainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            stop_flag: None,
        }
    }

    /// Add an observer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Attach a cooperative stop flag, checked between episodes only
    ///
    /// Setting the flag never interrupts an episode in flight; the run
    /// stops cleanly before the next one starts.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Run self-play training for the configured number of episodes
    ///
    /// A failed episode is logged, counted as a fault, and skipped; the
    /// run itself keeps going. Only observer and I/O errors abort it.
    pub fn run(
        &mut self,
        agent_x: &mut QLearningAgent,
        agent_o: &mut QLearningAgent,
    ) -> Result<TrainingStats> {
        if let Some(seed) = self.config.seed {
            agent_x.reseed(seed);
            agent_o.reseed(seed.wrapping_add(1));
        }

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut stats = TrainingStats::default();

        for episode in 0..self.config.episodes {
            if let Some(flag) = &self.stop_flag {
                if flag.load(Ordering::Relaxed) {
                    log::info!("stop requested, ending training after {episode} episodes");
                    break;
                }
            }

            let outcome = match play_episode(agent_x, agent_o) {
                Ok(outcome) => outcome,
                Err(err) => {
                    log::warn!("episode {episode} aborted: {err}");
                    stats.faults += 1;
                    continue;
                }
            };

            agent_x.decay_epsilon();
            agent_o.decay_epsilon();
            stats.record(outcome);

            for observer in &mut self.observers {
                observer.on_episode_end(episode, outcome)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(stats)
    }
}

/// Play one episode with live step-wise updates
fn play_episode(
    agent_x: &mut QLearningAgent,
    agent_o: &mut QLearningAgent,
) -> Result<Outcome> {
    let mut state = BoardState::new();
    // The mover's pending (state key, action), re-targeted on loss
    let mut pending_x: Option<(String, usize)> = None;
    let mut pending_o: Option<(String, usize)> = None;

    loop {
        let mover = state.to_move;
        let (agent, other) = match mover {
            Mark::X => (&mut *agent_x, &mut *agent_o),
            Mark::O => (&mut *agent_o, &mut *agent_x),
        };

        let action = agent.select_move(&state)?;
        let next = state.make_move(action)?;

        if let Some(outcome) = next.outcome() {
            // The mover's final transition takes the terminal target
            agent.observe_terminal(&state.encode(), action, outcome.reward_for(mover));

            // Re-target the opponent's pending transition with its reward
            let pending = match mover {
                Mark::X => pending_o.take(),
                Mark::O => pending_x.take(),
            };
            if let Some((key, act)) = pending {
                other.observe_terminal(&key, act, outcome.reward_for(mover.opponent()));
            }

            return Ok(outcome);
        }

        agent.observe_step(&state, action, &next);
        match mover {
            Mark::X => pending_x = Some((state.encode(), action)),
            Mark::O => pending_o = Some((state.encode(), action)),
        }

        state = next;
    }
}
