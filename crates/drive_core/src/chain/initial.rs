//! Empirical distribution of drive-opening states.

use std::collections::BTreeMap;

use super::state_key::StateKey;
use crate::drive::Drive;

#[derive(Debug, Clone, Default)]
pub struct InitialStateDistribution {
    counts: BTreeMap<StateKey, u64>,
    total: u64,
}

impl InitialStateDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drive_start(&mut self, drive: &Drive) {
        *self.counts.entry(StateKey::from(drive.first())).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, key: &StateKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Opener frequency per key, in key order. Empty when no drive was seen.
    pub fn distribution(&self) -> BTreeMap<StateKey, f64> {
        if self.total == 0 {
            return BTreeMap::new();
        }
        let total = self.total as f64;
        self.counts
            .iter()
            .map(|(k, c)| (*k, *c as f64 / total))
            .collect()
    }
}
