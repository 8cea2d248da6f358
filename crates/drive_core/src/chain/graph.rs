//! Weighted transition multigraph.
//!
//! One graph accumulates every drive of a run (all input files), then is
//! finalized once by value. Nothing is ever removed from it.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

use super::state_key::StateKey;
use crate::drive::Drive;
use crate::play::Outcome;

#[derive(Debug, Clone, Default)]
pub struct TransitionGraph {
    vertices: BTreeSet<StateKey>,
    /// from → (to → number of observed transitions)
    edges: FxHashMap<StateKey, FxHashMap<StateKey, u64>>,
    /// Terminal plays per outcome, indexed by `Outcome::index`
    terminal_counts: [u64; Outcome::COUNT],
    drives: u64,
    finalized: bool,
}

impl TransitionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every play's state and one edge per consecutive play pair.
    pub fn add_drive(&mut self, drive: &Drive) {
        if self.finalized {
            log::warn!(
                "Drive of {} ({} plays) added after finalize; ignored",
                drive.offense(),
                drive.len()
            );
            return;
        }

        self.vertices.extend(drive.plays().iter().map(StateKey::from));
        for pair in drive.plays().windows(2) {
            self.add_edge(StateKey::from(&pair[0]), StateKey::from(&pair[1]), 1);
        }
        if let Some(outcome) = drive.outcome() {
            self.terminal_counts[outcome.index()] += 1;
        }
        self.drives += 1;
    }

    /// Add absorbing self-loops and close the graph.
    ///
    /// Each absorbing state gets a self-loop weighted by how many drives
    /// ended in it (at least 1), so all five vertices exist and each row is
    /// strictly absorbing.
    pub fn finalize(mut self) -> Self {
        if self.finalized {
            return self;
        }
        for outcome in Outcome::ALL {
            let key = StateKey::Absorbing(outcome);
            let weight = self.terminal_counts[outcome.index()].max(1);
            self.add_edge(key, key, weight);
        }
        self.finalized = true;

        log::debug!(
            "Graph finalized: {} vertices, {} transitions from {} drives",
            self.vertex_count(),
            self.transition_count(),
            self.drives
        );
        self
    }

    fn add_edge(&mut self, from: StateKey, to: StateKey, weight: u64) {
        self.vertices.insert(from);
        self.vertices.insert(to);
        *self.edges.entry(from).or_default().entry(to).or_insert(0) += weight;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Vertices in key order.
    pub fn vertices(&self) -> impl Iterator<Item = &StateKey> {
        self.vertices.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_weight(&self, from: &StateKey, to: &StateKey) -> u64 {
        self.edges
            .get(from)
            .and_then(|targets| targets.get(to))
            .copied()
            .unwrap_or(0)
    }

    /// Outgoing edges of `from` (unordered).
    pub fn out_edges(&self, from: &StateKey) -> impl Iterator<Item = (&StateKey, u64)> {
        self.edges
            .get(from)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(k, w)| (k, *w)))
    }

    /// Size of the edge multiset.
    pub fn transition_count(&self) -> u64 {
        self.edges.values().flat_map(|t| t.values()).sum()
    }

    pub fn terminal_count(&self, outcome: Outcome) -> u64 {
        self.terminal_counts[outcome.index()]
    }

    pub fn drive_count(&self) -> u64 {
        self.drives
    }
}
