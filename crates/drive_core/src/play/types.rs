//! Play record types
//!
//! `RawEvent` is one play-by-play row as read from disk; `CanonicalPlay` is
//! the discretized form the chain is built from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One raw play-by-play row (column name → value).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    /// Source label, usually the file name
    pub source: String,
    /// 1-based data row number within the source (header excluded)
    pub row: usize,
    pub fields: BTreeMap<String, String>,
}

impl RawEvent {
    pub fn new(source: impl Into<String>, row: usize, fields: BTreeMap<String, String>) -> Self {
        Self {
            source: source.into(),
            row,
            fields,
        }
    }

    /// Build from `(column, value)` pairs. Mostly useful in tests.
    pub fn from_pairs<K, V>(source: impl Into<String>, row: usize, pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        Self::new(source, row, fields)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.source, self.row)
    }
}

/// The five absorbing outcomes of a drive.
///
/// Variant order is the lexical order of the names, which fixes the
/// position of each outcome in every matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    FieldGoal,
    Punt,
    Safety,
    Touchdown,
    Turnover,
}

impl Outcome {
    pub const COUNT: usize = 5;

    pub const ALL: [Outcome; Outcome::COUNT] = [
        Outcome::FieldGoal,
        Outcome::Punt,
        Outcome::Safety,
        Outcome::Touchdown,
        Outcome::Turnover,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Outcome::FieldGoal => "fieldgoal",
            Outcome::Punt => "punt",
            Outcome::Safety => "safety",
            Outcome::Touchdown => "touchdown",
            Outcome::Turnover => "turnover",
        }
    }

    pub fn from_name(name: &str) -> Option<Outcome> {
        Outcome::ALL.into_iter().find(|o| o.name() == name)
    }

    /// Position in `Outcome::ALL` and in the absorbing block of a matrix.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Six-valued play type as derived from the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    Regular,
    Punt,
    FieldGoal,
    Touchdown,
    Turnover,
    Safety,
}

impl PlayType {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            PlayType::Regular => None,
            PlayType::Punt => Some(Outcome::Punt),
            PlayType::FieldGoal => Some(Outcome::FieldGoal),
            PlayType::Touchdown => Some(Outcome::Touchdown),
            PlayType::Turnover => Some(Outcome::Turnover),
            PlayType::Safety => Some(Outcome::Safety),
        }
    }
}

impl From<Outcome> for PlayType {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::FieldGoal => PlayType::FieldGoal,
            Outcome::Punt => PlayType::Punt,
            Outcome::Safety => PlayType::Safety,
            Outcome::Touchdown => PlayType::Touchdown,
            Outcome::Turnover => PlayType::Turnover,
        }
    }
}

/// Discretized down-and-distance situation of a regular play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Situation {
    /// 1..=4
    pub down: u8,
    /// One of 0, 1, 3, 5, 7, 10
    pub togo_bucket: u8,
    /// 0..=10, tens of yards to the opponent's goal line
    pub yard_bucket: u8,
}

impl Situation {
    pub fn new(down: u8, togo_bucket: u8, yard_bucket: u8) -> Self {
        Self {
            down,
            togo_bucket,
            yard_bucket,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayKind {
    Regular(Situation),
    Terminal(Outcome),
}

/// A classified play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPlay {
    pub offense: String,
    pub kind: PlayKind,
}

impl CanonicalPlay {
    pub fn regular(offense: impl Into<String>, situation: Situation) -> Self {
        Self {
            offense: offense.into(),
            kind: PlayKind::Regular(situation),
        }
    }

    pub fn terminal(offense: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            offense: offense.into(),
            kind: PlayKind::Terminal(outcome),
        }
    }

    pub fn playtype(&self) -> PlayType {
        match self.kind {
            PlayKind::Regular(_) => PlayType::Regular,
            PlayKind::Terminal(outcome) => outcome.into(),
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self.kind, PlayKind::Regular(_))
    }

    pub fn situation(&self) -> Option<&Situation> {
        match &self.kind {
            PlayKind::Regular(s) => Some(s),
            PlayKind::Terminal(_) => None,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.kind {
            PlayKind::Regular(_) => None,
            PlayKind::Terminal(o) => Some(o),
        }
    }

    pub fn down(&self) -> Option<u8> {
        self.situation().map(|s| s.down)
    }
}
