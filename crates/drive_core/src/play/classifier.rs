//! Play Classifier
//!
//! Turns one play-by-play row into a `CanonicalPlay`.
//!
//! ## Play type precedence (first match wins)
//! 1. safety
//! 2. punt
//! 3. field goal
//! 4. turnover (fumble / interception)
//! 5. touchdown
//! 6. regular
//!
//! Safety is checked before punt: a blocked punt that ends in the end zone
//! is scored as a safety.

use super::types::{CanonicalPlay, PlayType, RawEvent, Situation};
use crate::config::{ColumnConfig, FilterConfig, KeywordConfig, ModelConfig};
use crate::error::MalformedPlayError;

/// Togo buckets, largest first: (lower bound, bucket)
const TOGO_BUCKETS: [(i64, u8); 5] = [(11, 10), (7, 7), (5, 5), (3, 3), (1, 1)];

/// Largest yard bucket (own goal line)
pub const MAX_YARD_BUCKET: u8 = 10;

/// Bucket yards-to-go: `>10→10, 7..=10→7, 5..=6→5, 3..=4→3, 1..=2→1, else→0`.
pub fn togo_bucket(togo: i64) -> u8 {
    TOGO_BUCKETS
        .iter()
        .find(|(lower, _)| togo >= *lower)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(0)
}

/// Bucket a yard line (yards to the opponent's goal) into tens of yards
/// from the offense's own goal line, clamped to `0..=10`.
pub fn yard_bucket(yard_line: f64) -> u8 {
    let bucket = ((100.0 - yard_line) / 10.0).floor();
    bucket.clamp(0.0, MAX_YARD_BUCKET as f64) as u8
}

#[derive(Debug, Clone, Default)]
pub struct PlayClassifier {
    columns: ColumnConfig,
    filter: FilterConfig,
    keywords: KeywordConfig,
}

impl PlayClassifier {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            filter: config.filter.clone(),
            keywords: config.keywords.clone(),
        }
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    pub fn offense_of<'a>(&self, event: &'a RawEvent) -> &'a str {
        event.get(&self.columns.offense).unwrap_or("").trim()
    }

    /// Filter precondition: false for kickoffs, tries, kick-formation
    /// penalties, blank descriptions and rows without a yards-to-go value.
    pub fn is_countable(&self, event: &RawEvent) -> bool {
        let desc = event
            .get(&self.columns.description)
            .unwrap_or("")
            .to_lowercase();

        if desc.replace('\u{a0}', "").trim().is_empty() {
            return false;
        }
        if self
            .filter
            .excluded_markers
            .iter()
            .any(|marker| desc.contains(marker.as_str()))
        {
            return false;
        }

        event
            .get(&self.columns.togo)
            .is_some_and(|togo| !togo.trim().is_empty())
    }

    /// Play type from the description alone.
    pub fn playtype(&self, description: &str) -> PlayType {
        let desc = description.to_lowercase();
        let hit = |words: &[String]| words.iter().any(|w| desc.contains(w.as_str()));

        let kw = &self.keywords;
        if hit(&kw.safety) {
            PlayType::Safety
        } else if hit(&kw.punt) {
            PlayType::Punt
        } else if hit(&kw.field_goal) {
            PlayType::FieldGoal
        } else if hit(&kw.turnover) {
            PlayType::Turnover
        } else if hit(&kw.touchdown) {
            PlayType::Touchdown
        } else {
            PlayType::Regular
        }
    }

    /// Classify one (already filtered) event.
    ///
    /// Turnovers on downs are not detected here; see
    /// [`crate::drive::correct_turnover_on_downs`].
    pub fn classify(&self, event: &RawEvent) -> Result<CanonicalPlay, MalformedPlayError> {
        let offense = self.offense_of(event);
        let desc = event.get(&self.columns.description).unwrap_or("");

        match self.playtype(desc).outcome() {
            Some(outcome) => Ok(CanonicalPlay::terminal(offense, outcome)),
            None => {
                let situation = self.situation(event)?;
                Ok(CanonicalPlay::regular(offense, situation))
            }
        }
    }

    fn situation(&self, event: &RawEvent) -> Result<Situation, MalformedPlayError> {
        let down = parse_field(event, &self.columns.down, "down", |raw| {
            raw.parse::<u8>().ok().filter(|d| (1..=4).contains(d))
        })?;
        let togo = parse_field(event, &self.columns.togo, "togo", |raw| {
            raw.parse::<i64>().ok()
        })?;
        let yard_line = parse_field(event, &self.columns.yard_line, "ydline", |raw| {
            raw.parse::<f64>().ok().filter(|y| y.is_finite())
        })?;

        Ok(Situation::new(down, togo_bucket(togo), yard_bucket(yard_line)))
    }
}

fn parse_field<T>(
    event: &RawEvent,
    column: &str,
    name: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, MalformedPlayError> {
    let raw = event.get(column).unwrap_or("").trim();
    parse(raw).ok_or_else(|| MalformedPlayError {
        location: event.location(),
        field: name,
        value: raw.to_string(),
        event: event.clone(),
    })
}
