//! # Drive Markov chain
//!
//! Graph accumulation, matrix materialization and the absorption solve.
//!
//! ```text
//! Drive ──add_drive──▶ TransitionGraph ──finalize──▶ CountMatrix
//!   │                                                   │ normalize
//!   └─record_drive_start─▶ InitialStateDistribution     ▼
//!                                  AbsorptionResult ◀── TransitionMatrix
//! ```

pub mod absorption;
pub mod graph;
pub mod initial;
pub mod matrix;
pub mod state_key;

pub use absorption::{solve_absorption, AbsorptionResult};
pub use graph::TransitionGraph;
pub use initial::InitialStateDistribution;
pub use matrix::{CountMatrix, TransitionMatrix, ROW_SUM_TOLERANCE};
pub use state_key::{ParseStateKeyError, StateKey};
