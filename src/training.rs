//! Self-play training, observers, and evaluation

pub mod evaluation;
pub mod observers;
pub mod selfplay;

pub use evaluation::{RandomOpponent, evaluate_vs_random};
pub use observers::{Observer, ProgressObserver};
pub use selfplay::{SelfPlayTrainer, TrainingConfig, TrainingStats};
