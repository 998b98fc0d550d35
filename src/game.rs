//! Tic-Tac-Toe board model
//!
//! Board states are small value types: every mutation returns a new state,
//! so callers own copies and no move can be applied behind another
//! component's back.

pub mod board;
pub mod lines;

pub use board::{BoardState, Cell, Mark, Outcome};
pub use lines::WINNING_LINES;
