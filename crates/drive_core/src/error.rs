use thiserror::Error;

use crate::chain::StateKey;
use crate::play::RawEvent;

/// A regular play whose down, yards-to-go or yard line could not be read.
///
/// Carries the whole raw record so it can be written out for review.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Malformed play at {location}: invalid {field} value '{value}'")]
pub struct MalformedPlayError {
    /// `file:row` of the offending record
    pub location: String,
    /// Logical field that failed (`down`, `togo`, `ydline`)
    pub field: &'static str,
    /// Raw value as read (empty when the column is missing)
    pub value: String,
    pub event: RawEvent,
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{count} malformed play(s) rejected; see the review report")]
    Malformed { count: usize },

    #[error("States with zero outgoing mass: {}", join_keys(.states))]
    ZeroOutgoingMass { states: Vec<StateKey> },

    #[error("Absorption system is singular (absorbing column {column})")]
    SingularSystem { column: usize },

    #[error("Absorbing states are not at indices 0..{expected}: found [{}]", join_keys(.found))]
    MisalignedStates { expected: usize, found: Vec<StateKey> },

    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
}

impl ModelError {
    /// Whether the run may continue after this error (per-record errors only).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ModelError::Malformed { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown zero-row policy: {0}")]
    UnknownPolicy(String),
}

fn join_keys(keys: &[StateKey]) -> String {
    keys.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub type Result<T> = std::result::Result<T, ModelError>;
