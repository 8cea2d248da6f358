use serde::{Deserialize, Serialize};

/// Names of the play-by-play columns the model reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub offense: String,
    pub down: String,
    pub togo: String,
    pub yard_line: String,
    pub description: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            offense: "off".to_string(),
            down: "down".to_string(),
            togo: "togo".to_string(),
            yard_line: "ydline".to_string(),
            description: "description".to_string(),
        }
    }
}

/// Markers (lowercase substrings of the description) for rows that never
/// enter a drive: kickoffs, tries after touchdowns, kick-formation penalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub excluded_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_markers: vec![
                "kicks".to_string(),
                "extra point".to_string(),
                "two-point".to_string(),
                "(kick formation) penalty".to_string(),
            ],
        }
    }
}
