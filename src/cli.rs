//! Command-line interface for training and evaluating agents

pub mod commands;
pub mod output;
