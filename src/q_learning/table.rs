//! Q-table mapping (state, action) pairs to value estimates

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Q-table keyed by (board encoding, action position)
///
/// Lookups of unseen pairs return 0.0; entries are created lazily by
/// `update` and only removed by `reset`. The learning rate and discount
/// factor are fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    /// (state_key, action) -> running estimate of expected return
    q_values: HashMap<(String, usize), f64>,
    /// Learning rate α
    alpha: f64,
    /// Discount factor γ
    gamma: f64,
}

impl QTable {
    /// Create an empty table with the given learning rate and discount
    pub fn new(alpha: f64, gamma: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            alpha,
            gamma,
        }
    }

    /// Q-value for a state-action pair, 0.0 if unseen. Never fails.
    pub fn get(&self, state_key: &str, action: usize) -> f64 {
        self.q_values
            .get(&(state_key.to_string(), action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Maximum Q-value over the supplied actions (0.0 for an empty slice)
    pub fn max_q(&self, state_key: &str, actions: &[usize]) -> f64 {
        if actions.is_empty() {
            return 0.0;
        }
        actions
            .iter()
            .map(|&action| self.get(state_key, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Action with the highest Q-value among `actions`
    ///
    /// Ties break toward the first maximizer in the supplied order;
    /// `BoardState::legal_moves` yields ascending indices, so in practice
    /// ties break toward the lowest position. Returns `None` only when
    /// `actions` is empty.
    pub fn best_action(&self, state_key: &str, actions: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &action in actions {
            let q = self.get(state_key, action);
            match best {
                Some((_, best_q)) if q <= best_q => {}
                _ => best = Some((action, q)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Apply one Q-learning update
    ///
    /// `target = reward + γ max_a' Q(next, a')` for a non-terminal next
    /// state, or plain `reward` when `terminal` (no bootstrapping past the
    /// end of an episode).
    pub fn update(
        &mut self,
        state_key: &str,
        action: usize,
        reward: f64,
        next_state_key: &str,
        next_actions: &[usize],
        terminal: bool,
    ) {
        let bootstrap = if terminal {
            0.0
        } else {
            self.max_q(next_state_key, next_actions)
        };
        let target = reward + self.gamma * bootstrap;
        let current = self.get(state_key, action);
        let updated = current + self.alpha * (target - current);
        self.q_values
            .insert((state_key.to_string(), action), updated);
    }

    /// Learning rate α
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Discount factor γ
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Drop every entry
    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }

    /// Iterate over stored ((state_key, action), value) entries
    pub fn iter(&self) -> impl Iterator<Item = (&(String, usize), &f64)> {
        self.q_values.iter()
    }
}
