//! Q-learning agent: a mark, a value table, and an exploration schedule

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    game::{BoardState, Mark, Outcome},
    q_learning::{policy::EpsilonGreedy, table::QTable},
};

/// Learning and exploration parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Initial exploration rate ε
    pub epsilon: f64,
    /// Multiplicative ε decay per episode
    pub epsilon_decay: f64,
    /// Exploration floor
    pub min_epsilon: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 1.0,
            epsilon_decay: 0.999,
            min_epsilon: 0.01,
        }
    }
}

/// Serializable snapshot of an agent, used by the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState {
    pub table: QTable,
    pub epsilon: f64,
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
    pub rng_seed: Option<u64>,
}

/// A Q-learning agent for one mark
///
/// X and O agents own independent tables; nothing is shared between them
/// unless the caller arranges it.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    mark: Mark,
    table: QTable,
    policy: EpsilonGreedy,
    epsilon: f64,
    initial_epsilon: f64,
    epsilon_decay: f64,
    min_epsilon: f64,
}

impl QLearningAgent {
    /// Create a fresh agent with an unseeded RNG
    pub fn new(mark: Mark, hyper: Hyperparameters) -> Self {
        Self {
            mark,
            table: QTable::new(hyper.alpha, hyper.gamma),
            policy: EpsilonGreedy::new(),
            epsilon: hyper.epsilon,
            initial_epsilon: hyper.epsilon,
            epsilon_decay: hyper.epsilon_decay,
            min_epsilon: hyper.min_epsilon,
        }
    }

    /// Seed the exploration RNG for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.policy.reseed(seed);
        self
    }

    /// Reseed the exploration RNG in place
    pub fn reseed(&mut self, seed: u64) {
        self.policy.reseed(seed);
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Read access to the underlying value table
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Select a move with the agent's current exploration rate
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalMoves`] if the state is terminal.
    pub fn select_move(&mut self, state: &BoardState) -> Result<usize> {
        let key = state.encode();
        let legal = state.legal_moves();
        self.policy.select(&self.table, &key, &legal, self.epsilon)
    }

    /// Select the greedy move (ε = 0), used at play and evaluation time
    pub fn greedy_move(&mut self, state: &BoardState) -> Result<usize> {
        let key = state.encode();
        let legal = state.legal_moves();
        self.policy.select(&self.table, &key, &legal, 0.0)
    }

    /// Non-terminal bootstrap update for a transition the agent just took
    ///
    /// `next` is the state immediately after the agent's own move; the
    /// bootstrap maximizes this agent's table over that state's legal
    /// moves, with immediate reward 0.
    pub fn observe_step(&mut self, state: &BoardState, action: usize, next: &BoardState) {
        let next_key = next.encode();
        let next_legal = next.legal_moves();
        self.table
            .update(&state.encode(), action, 0.0, &next_key, &next_legal, false);
    }

    /// Terminal update: the target is the reward alone, no bootstrapping
    pub fn observe_terminal(&mut self, state_key: &str, action: usize, reward: f64) {
        self.table.update(state_key, action, reward, "", &[], true);
    }

    /// Replay a complete X-first game and apply this agent's updates
    ///
    /// Produces the same update sequence the self-play driver applies for
    /// this agent's mark: a bootstrap update per own move, plus a terminal
    /// re-target of the final own transition. Decays ε afterwards. This is
    /// the entry point for online learning from human-vs-AI games reported
    /// across the GUI boundary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalMove`] if the move list does not
    /// replay cleanly from the empty board.
    pub fn learn_from_episode(&mut self, moves: &[usize], outcome: Outcome) -> Result<()> {
        let last_own_index = moves
            .iter()
            .enumerate()
            .filter(|(i, _)| self.owns_ply(*i))
            .map(|(i, _)| i)
            .next_back();

        let mut state = BoardState::new();
        for (i, &action) in moves.iter().enumerate() {
            let next = state.make_move(action)?;

            if self.owns_ply(i) {
                let state_key = state.encode();
                if next.is_terminal() {
                    // The agent's own move ended the game.
                    self.observe_terminal(&state_key, action, outcome.reward_for(self.mark));
                } else {
                    self.observe_step(&state, action, &next);
                    if Some(i) == last_own_index {
                        // The opponent's reply ended the game; re-target
                        // the final transition with the terminal reward.
                        self.observe_terminal(&state_key, action, outcome.reward_for(self.mark));
                    }
                }
            }

            state = next;
        }

        self.decay_epsilon();
        Ok(())
    }

    /// Whether ply `i` of an X-first game belongs to this agent
    fn owns_ply(&self, i: usize) -> bool {
        let mover = if i % 2 == 0 { Mark::X } else { Mark::O };
        mover == self.mark
    }

    /// Multiplicative ε decay, floored at the configured minimum
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.min_epsilon);
    }

    /// Clear the table and restore the initial exploration schedule
    pub fn reset(&mut self) {
        self.table.reset();
        self.epsilon = self.initial_epsilon;
        self.policy.reset();
    }

    pub(crate) fn export_state(&self) -> AgentState {
        AgentState {
            table: self.table.clone(),
            epsilon: self.epsilon,
            initial_epsilon: self.initial_epsilon,
            epsilon_decay: self.epsilon_decay,
            min_epsilon: self.min_epsilon,
            rng_seed: self.policy.seed(),
        }
    }

    pub(crate) fn from_state(mark: Mark, state: AgentState) -> Self {
        let policy = match state.rng_seed {
            Some(seed) => EpsilonGreedy::with_seed(seed),
            None => EpsilonGreedy::new(),
        };
        Self {
            mark,
            table: state.table,
            policy,
            epsilon: state.epsilon,
            initial_epsilon: state.initial_epsilon,
            epsilon_decay: state.epsilon_decay,
            min_epsilon: state.min_epsilon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greedy_hyper() -> Hyperparameters {
        Hyperparameters {
            epsilon: 0.0,
            ..Hyperparameters::default()
        }
    }

    #[test]
    fn epsilon_decays_to_the_floor() {
        let mut agent = QLearningAgent::new(
            Mark::X,
            Hyperparameters {
                epsilon: 1.0,
                epsilon_decay: 0.5,
                min_epsilon: 0.1,
                ..Hyperparameters::default()
            },
        );
        for _ in 0..10 {
            agent.decay_epsilon();
        }
        assert!((agent.epsilon() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn select_move_on_terminal_state_fails() {
        let mut agent = QLearningAgent::new(Mark::X, Hyperparameters::default()).with_seed(5);
        let board = BoardState::from_string("XXXOO....").unwrap();
        assert!(matches!(
            agent.select_move(&board),
            Err(crate::Error::NoLegalMoves)
        ));
    }

    #[test]
    fn greedy_move_with_flat_table_picks_lowest_index() {
        // O answers X's center opening with position 0 when every reply
        // carries equal (zero) value.
        let mut agent = QLearningAgent::new(Mark::O, greedy_hyper()).with_seed(9);
        let board = BoardState::new().make_move(4).unwrap();
        assert_eq!(agent.greedy_move(&board).unwrap(), 0);
    }

    #[test]
    fn winning_episode_raises_the_winning_move_value() {
        // X wins via the top row: X 0, O 3, X 1, O 4, X 2.
        let moves = [0, 3, 1, 4, 2];
        let mut agent = QLearningAgent::new(Mark::X, Hyperparameters::default());
        agent
            .learn_from_episode(&moves, Outcome::Win(Mark::X))
            .unwrap();

        // The state before X's winning move, after four plies.
        let mut state = BoardState::new();
        for &mv in &moves[..4] {
            state = state.make_move(mv).unwrap();
        }
        let q = agent.table().get(&state.encode(), 2);
        // One terminal update from zero: α · (+1).
        assert!((q - 0.1).abs() < 1e-12, "got {q}");
    }

    #[test]
    fn losing_episode_lowers_the_final_transition() {
        // X wins via the top row; O's last move was at ply 3 (position 4).
        let moves = [0, 3, 1, 4, 2];
        let mut agent = QLearningAgent::new(Mark::O, Hyperparameters::default());
        agent
            .learn_from_episode(&moves, Outcome::Win(Mark::X))
            .unwrap();

        let mut state = BoardState::new();
        for &mv in &moves[..3] {
            state = state.make_move(mv).unwrap();
        }
        let q = agent.table().get(&state.encode(), 4);
        assert!(q < 0.0, "loser's final transition should go negative, got {q}");
    }

    #[test]
    fn drawn_episode_keeps_values_at_zero() {
        // X X O / O O X / X O X, no winner.
        let moves = [0, 2, 1, 3, 5, 4, 6, 7, 8];
        let mut agent = QLearningAgent::new(Mark::X, Hyperparameters::default());
        agent.learn_from_episode(&moves, Outcome::Draw).unwrap();
        // Draw pays 0 and every intermediate bootstrap starts from zero.
        for (_, &v) in agent.table().iter() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn corrupt_move_list_is_rejected() {
        let mut agent = QLearningAgent::new(Mark::X, Hyperparameters::default());
        let result = agent.learn_from_episode(&[0, 0], Outcome::Draw);
        assert!(matches!(result, Err(crate::Error::IllegalMove { .. })));
    }

    #[test]
    fn state_roundtrip_preserves_table_and_schedule() {
        let mut agent = QLearningAgent::new(Mark::X, Hyperparameters::default()).with_seed(17);
        agent
            .learn_from_episode(&[0, 3, 1, 4, 2], Outcome::Win(Mark::X))
            .unwrap();

        let exported = agent.export_state();
        let restored = QLearningAgent::from_state(Mark::X, exported);
        assert_eq!(restored.table().len(), agent.table().len());
        assert!((restored.epsilon() - agent.epsilon()).abs() < 1e-12);
        for (key, &v) in agent.table().iter() {
            assert_eq!(restored.table().get(&key.0, key.1), v);
        }
    }
}
