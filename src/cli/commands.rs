//! CLI commands

pub mod evaluate;
pub mod train;
