//! Markov chain vertex keys.
//!
//! Absorbing keys print as the outcome name (`touchdown`, ...). Situation
//! keys print as `z{yard}_{togo}_{down}`; the `z` marker sorts after every
//! digit and the separators keep two-digit yard buckets unambiguous.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::play::{CanonicalPlay, Outcome, PlayKind, Situation};

pub const SITUATION_MARKER: char = 'z';

/// One vertex of the drive chain.
///
/// The derived order puts every absorbing key before every situation key,
/// absorbing keys in `Outcome::ALL` order. Matrices rely on this to find
/// the absorbing block at indices `0..Outcome::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StateKey {
    Absorbing(Outcome),
    Situation { yard: u8, togo: u8, down: u8 },
}

impl StateKey {
    pub fn situation(situation: &Situation) -> Self {
        StateKey::Situation {
            yard: situation.yard_bucket,
            togo: situation.togo_bucket,
            down: situation.down,
        }
    }

    pub fn is_absorbing(&self) -> bool {
        matches!(self, StateKey::Absorbing(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            StateKey::Absorbing(o) => Some(*o),
            StateKey::Situation { .. } => None,
        }
    }

    /// The five absorbing keys in matrix order.
    pub fn absorbing_keys() -> [StateKey; Outcome::COUNT] {
        Outcome::ALL.map(StateKey::Absorbing)
    }
}

impl From<&CanonicalPlay> for StateKey {
    fn from(play: &CanonicalPlay) -> Self {
        match &play.kind {
            PlayKind::Regular(s) => StateKey::situation(s),
            PlayKind::Terminal(o) => StateKey::Absorbing(*o),
        }
    }
}

impl From<Outcome> for StateKey {
    fn from(outcome: Outcome) -> Self {
        StateKey::Absorbing(outcome)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StateKey::Absorbing(o) => f.write_str(o.name()),
            StateKey::Situation { yard, togo, down } => {
                write!(f, "{}{}_{}_{}", SITUATION_MARKER, yard, togo, down)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid state key: '{0}'")]
pub struct ParseStateKeyError(pub String);

impl FromStr for StateKey {
    type Err = ParseStateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(outcome) = Outcome::from_name(s) {
            return Ok(StateKey::Absorbing(outcome));
        }

        let err = || ParseStateKeyError(s.to_string());
        let body = s.strip_prefix(SITUATION_MARKER).ok_or_else(err)?;
        let parts: Vec<u8> = body
            .split('_')
            .map(|p| p.parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| err())?;

        match parts.as_slice() {
            [yard, togo, down] => Ok(StateKey::Situation {
                yard: *yard,
                togo: *togo,
                down: *down,
            }),
            _ => Err(err()),
        }
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for StateKey {
    type Error = ParseStateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorbing_keys_sort_first() {
        let mut keys = vec![
            StateKey::Situation { yard: 0, togo: 0, down: 1 },
            StateKey::Absorbing(Outcome::Turnover),
            StateKey::Situation { yard: 10, togo: 10, down: 4 },
            StateKey::Absorbing(Outcome::FieldGoal),
            StateKey::Absorbing(Outcome::Safety),
            StateKey::Absorbing(Outcome::Punt),
            StateKey::Absorbing(Outcome::Touchdown),
        ];
        keys.sort();
        assert_eq!(&keys[..5], &StateKey::absorbing_keys());
        assert!(keys[5..].iter().all(|k| !k.is_absorbing()));
    }

    #[test]
    fn test_two_digit_yard_does_not_collide() {
        // Concatenated, both of these would read "z1011".
        let a = StateKey::Situation { yard: 10, togo: 1, down: 1 };
        let b = StateKey::Situation { yard: 1, togo: 0, down: 11 };
        assert_ne!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "z10_1_1");
    }

    #[test]
    fn test_parse_round_trip() {
        for text in ["fieldgoal", "punt", "safety", "touchdown", "turnover", "z3_7_1", "z10_10_4"] {
            let key: StateKey = text.parse().unwrap();
            assert_eq!(key.to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["td", "z3_7", "z3_7_1_2", "3_7_1", "zx_1_1", ""] {
            assert!(text.parse::<StateKey>().is_err(), "{}", text);
        }
    }

    #[test]
    fn test_from_play() {
        let play = CanonicalPlay::regular("DEN", Situation::new(2, 7, 2));
        assert_eq!(StateKey::from(&play), StateKey::Situation { yard: 2, togo: 7, down: 2 });
        let td = CanonicalPlay::terminal("DEN", Outcome::Touchdown);
        assert_eq!(StateKey::from(&td), StateKey::Absorbing(Outcome::Touchdown));
    }

    #[test]
    fn test_serde_as_string() {
        let key = StateKey::Situation { yard: 4, togo: 3, down: 3 };
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"z4_3_3\"");
        let back: StateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
