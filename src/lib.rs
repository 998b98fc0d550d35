//! Tabular Q-learning engine for Tic-Tac-Toe
//!
//! This crate provides:
//! - Complete Tic-Tac-Toe board model with validation
//! - A Q-table with the standard off-policy TD update rule
//! - Epsilon-greedy exploration with per-episode decay
//! - A self-play training driver with outcome statistics
//! - MessagePack persistence of learned value tables
//! - A small boundary API for an external GUI (move requests,
//!   human moves, optional online learning)

pub mod cli;
pub mod error;
pub mod game;
pub mod interface;
pub mod persistence;
pub mod q_learning;
pub mod training;

pub use error::{Error, Result};
pub use game::{BoardState, Cell, Mark, Outcome};
pub use interface::PlaySession;
pub use persistence::{SavedAgent, TrainingMetadata};
pub use q_learning::{Hyperparameters, QLearningAgent, QTable};
pub use training::{SelfPlayTrainer, TrainingConfig, TrainingStats};
