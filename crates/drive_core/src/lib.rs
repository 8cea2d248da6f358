//! # drive_core - Absorbing Markov Chain Model of Offensive Drives
//!
//! Turns American-football play-by-play rows into a discrete-state Markov
//! chain over down / distance / field-position situations and solves, for
//! every situation, the probability that the drive ends in each of five
//! outcomes: field goal, punt, safety, touchdown, turnover.
//!
//! ## Features
//! - Structured state keys (no concatenation collisions)
//! - Turnover-on-downs correction at drive boundaries
//! - Explicit zero-row policy instead of division by zero
//! - Malformed records collected for batch review, never prompted for
//!
//! ## Pipeline
//! ```text
//! RawEvent → PlayClassifier → segment → TransitionGraph → CountMatrix
//!          → TransitionMatrix → AbsorptionResult
//! ```

pub mod chain;
pub mod config;
pub mod drive;
pub mod error;
pub mod pipeline;
pub mod play;

pub use chain::{
    solve_absorption, AbsorptionResult, CountMatrix, InitialStateDistribution, StateKey,
    TransitionGraph, TransitionMatrix,
};
pub use config::{ModelConfig, ZeroRowPolicy};
pub use drive::{correct_turnover_on_downs, segment, Drive};
pub use error::{ConfigError, MalformedPlayError, ModelError, Result};
pub use pipeline::{DriveModel, ModelBuilder, RunReport};
pub use play::{CanonicalPlay, Outcome, PlayClassifier, PlayType, RawEvent, Situation};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
