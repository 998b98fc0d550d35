//! Tabular Q-learning: value table, exploration policy, and agent
//!
//! The update rule is standard off-policy TD control:
//!
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') − Q(s,a)]
//!
//! with the bootstrap term dropped on terminal transitions. States are
//! keyed by their stable 9-character board encoding; unseen pairs read as
//! 0.0 through an explicit lookup-with-default contract.

pub mod agent;
pub mod policy;
pub mod table;

pub use agent::{Hyperparameters, QLearningAgent};
pub use policy::EpsilonGreedy;
pub use table::QTable;
