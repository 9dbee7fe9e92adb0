//! Solver library for number pyramid puzzles.
//!
//! In a number pyramid every cell equals the sum of the two cells directly
//! below it. Given a partially filled pyramid, this crate finds every
//! completion (up to a configurable cap) by repairing deducible cells and
//! backtracking over the bottom layer.

pub mod error;
pub mod pruning;
pub mod pyramid;
pub mod repair;
pub mod solver;

// Re-export main types
pub use error::{PyramidError, ShapeViolation};
pub use pyramid::{Cell, Pyramid, PyramidPuzzle, Value};
pub use repair::repair;
pub use solver::{search, solve, solve_layers, SolverConfig, SolverResult};
