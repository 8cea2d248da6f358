//! Count and transition matrices over the ordered state keys.

use nalgebra::DMatrix;
use std::collections::HashMap;

use super::graph::TransitionGraph;
use super::state_key::StateKey;
use crate::error::{ModelError, Result};

/// Row sums of a stochastic row must be 1 within this tolerance.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// `counts[(i, j)]` = observed transitions from `keys[i]` to `keys[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatrix {
    keys: Vec<StateKey>,
    counts: DMatrix<u64>,
}

impl CountMatrix {
    /// Materialize a graph; keys in `StateKey` order (absorbing first).
    pub fn from_graph(graph: &TransitionGraph) -> Self {
        let keys: Vec<StateKey> = graph.vertices().copied().collect();
        let index = index_of(&keys);
        let n = keys.len();

        let mut counts = DMatrix::<u64>::zeros(n, n);
        for (i, from) in keys.iter().enumerate() {
            for (to, weight) in graph.out_edges(from) {
                counts[(i, index[to])] += weight;
            }
        }

        Self { keys, counts }
    }

    pub fn keys(&self) -> &[StateKey] {
        &self.keys
    }

    pub fn matrix(&self) -> &DMatrix<u64> {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index(&self, key: &StateKey) -> Option<usize> {
        self.keys.binary_search(key).ok()
    }

    pub fn get(&self, from: &StateKey, to: &StateKey) -> u64 {
        match (self.index(from), self.index(to)) {
            (Some(i), Some(j)) => self.counts[(i, j)],
            _ => 0,
        }
    }

    pub fn row_sum(&self, i: usize) -> u64 {
        self.counts.row(i).iter().sum()
    }

    /// Transient states that are never the source of a transition.
    pub fn dangling_states(&self) -> Vec<StateKey> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(i, k)| !k.is_absorbing() && self.row_sum(*i) == 0)
            .map(|(_, k)| *k)
            .collect()
    }

    /// Drop dangling transient states and the edges into them, repeating
    /// until none remain. Absorbing states are never dropped.
    pub fn prune_dangling(&self) -> (CountMatrix, Vec<StateKey>) {
        let mut current = self.clone();
        let mut pruned = Vec::new();

        loop {
            let dangling = current.dangling_states();
            if dangling.is_empty() {
                break;
            }
            let keep: Vec<usize> = (0..current.len())
                .filter(|&i| !dangling.contains(&current.keys[i]))
                .collect();
            current = current.select(&keep);
            pruned.extend(dangling);
        }

        pruned.sort();
        (current, pruned)
    }

    fn select(&self, keep: &[usize]) -> CountMatrix {
        CountMatrix {
            keys: keep.iter().map(|&i| self.keys[i]).collect(),
            counts: self.counts.select_rows(keep).select_columns(keep),
        }
    }
}

/// Row-normalized count matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    keys: Vec<StateKey>,
    probs: DMatrix<f64>,
    /// Rows that had no outgoing mass; left all-zero
    zero_rows: Vec<StateKey>,
}

impl TransitionMatrix {
    /// Divide every row by its sum. Zero-sum rows stay zero and are
    /// recorded in [`zero_rows`](Self::zero_rows).
    pub fn normalize(counts: &CountMatrix) -> Self {
        let n = counts.len();
        let mut probs = DMatrix::<f64>::zeros(n, n);
        let mut zero_rows = Vec::new();

        for i in 0..n {
            let total = counts.row_sum(i);
            if total == 0 {
                zero_rows.push(counts.keys[i]);
                continue;
            }
            let total = total as f64;
            for j in 0..n {
                probs[(i, j)] = counts.counts[(i, j)] as f64 / total;
            }
        }

        if !zero_rows.is_empty() {
            log::debug!("{} zero-mass row(s) left unnormalized", zero_rows.len());
        }

        Self {
            keys: counts.keys.clone(),
            probs,
            zero_rows,
        }
    }

    /// Rebuild from stored keys and probabilities (e.g. a saved matrix).
    pub fn from_parts(keys: Vec<StateKey>, probs: DMatrix<f64>) -> Result<Self> {
        if probs.nrows() != probs.ncols() || probs.nrows() != keys.len() {
            return Err(ModelError::NotSquare {
                rows: probs.nrows(),
                cols: probs.ncols().max(keys.len()),
            });
        }
        let zero_rows = keys
            .iter()
            .enumerate()
            .filter(|(i, _)| probs.row(*i).iter().all(|p| *p == 0.0))
            .map(|(_, k)| *k)
            .collect();

        Ok(Self {
            keys,
            probs,
            zero_rows,
        })
    }

    pub fn keys(&self) -> &[StateKey] {
        &self.keys
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.probs
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn zero_rows(&self) -> &[StateKey] {
        &self.zero_rows
    }

    pub fn get(&self, from: &StateKey, to: &StateKey) -> f64 {
        // Keys loaded through `from_parts` are not guaranteed sorted.
        let i = self.keys.iter().position(|k| k == from);
        let j = self.keys.iter().position(|k| k == to);
        match (i, j) {
            (Some(i), Some(j)) => self.probs[(i, j)],
            _ => 0.0,
        }
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.probs.row(i).iter().sum()
    }

    /// Fail with `ZeroOutgoingMass` if any row had nothing to normalize.
    pub fn ensure_stochastic(&self) -> Result<()> {
        if self.zero_rows.is_empty() {
            Ok(())
        } else {
            Err(ModelError::ZeroOutgoingMass {
                states: self.zero_rows.clone(),
            })
        }
    }
}

fn index_of(keys: &[StateKey]) -> HashMap<StateKey, usize> {
    keys.iter().enumerate().map(|(i, k)| (*k, i)).collect()
}
