use serde::{Deserialize, Serialize};

/// Lowercase description keywords per play type.
///
/// Precedence is fixed by the classifier (safety, punt, field goal,
/// turnover, touchdown); only the word lists are configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub safety: Vec<String>,
    pub punt: Vec<String>,
    pub field_goal: Vec<String>,
    pub turnover: Vec<String>,
    pub touchdown: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            safety: words(&["safety"]),
            punt: words(&["punt"]),
            field_goal: words(&["field goal"]),
            turnover: words(&["fumble", "intercepted", "turnover"]),
            touchdown: words(&["touchdown"]),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}
