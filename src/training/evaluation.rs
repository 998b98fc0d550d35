//! Evaluation of a frozen agent against a uniform-random opponent

use rand::{rngs::StdRng, seq::IndexedRandom};

use crate::{
    Result,
    game::{BoardState, Outcome},
    q_learning::{QLearningAgent, policy::build_rng},
    training::selfplay::TrainingStats,
};

/// Opponent that picks uniformly among the legal moves
pub struct RandomOpponent {
    rng: StdRng,
}

impl RandomOpponent {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: build_rng(seed),
        }
    }

    /// Pick a legal move at random
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalMoves`] if the state is terminal.
    pub fn select_move(&mut self, state: &BoardState) -> Result<usize> {
        state
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or(crate::Error::NoLegalMoves)
    }
}

/// Play `games` against a random opponent with the agent frozen at ε = 0
///
/// The agent keeps its own mark; the opponent fills the other seat. No
/// learning updates are applied, this measures the table as it stands.
pub fn evaluate_vs_random(
    agent: &mut QLearningAgent,
    games: usize,
    seed: Option<u64>,
) -> Result<TrainingStats> {
    let mut opponent = RandomOpponent::new(seed);
    let mut stats = TrainingStats::default();

    for _ in 0..games {
        let outcome = play_game(agent, &mut opponent)?;
        stats.record(outcome);
    }

    Ok(stats)
}

fn play_game(agent: &mut QLearningAgent, opponent: &mut RandomOpponent) -> Result<Outcome> {
    let mut state = BoardState::new();

    loop {
        let action = if state.to_move == agent.mark() {
            agent.greedy_move(&state)?
        } else {
            opponent.select_move(&state)?
        };
        state = state.make_move(action)?;

        if let Some(outcome) = state.outcome() {
            return Ok(outcome);
        }
    }
}
