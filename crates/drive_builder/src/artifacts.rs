//! Model artifact CSV files
//!
//! Matrix layout: the header row is the ordered state keys, data rows follow
//! in the same order. `initial_states.csv` has the same header form over
//! opener keys and one row. `abs_prob.csv` is the exception: one row per
//! state with the key in the first column and one column per outcome.

use anyhow::{bail, Context, Result};
use drive_core::{
    AbsorptionResult, CountMatrix, InitialStateDistribution, MalformedPlayError, Outcome,
    StateKey, TransitionMatrix,
};
use nalgebra::DMatrix;
use std::collections::BTreeSet;
use std::path::Path;

pub const COUNTS_FILE: &str = "cis.csv";
pub const TRANSITION_FILE: &str = "trans.csv";
pub const INITIAL_FILE: &str = "initial_states.csv";
pub const ABSORPTION_FILE: &str = "abs_prob.csv";
pub const MALFORMED_FILE: &str = "malformed.csv";

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn key_header(keys: &[StateKey]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

pub fn write_count_matrix(path: &Path, counts: &CountMatrix) -> Result<()> {
    let mut w = writer(path)?;
    w.write_record(key_header(counts.keys()))?;
    let m = counts.matrix();
    for i in 0..m.nrows() {
        w.write_record((0..m.ncols()).map(|j| m[(i, j)].to_string()))?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_transition_matrix(path: &Path, trans: &TransitionMatrix) -> Result<()> {
    let mut w = writer(path)?;
    w.write_record(key_header(trans.keys()))?;
    let m = trans.matrix();
    for i in 0..m.nrows() {
        w.write_record((0..m.ncols()).map(|j| m[(i, j)].to_string()))?;
    }
    w.flush()?;
    Ok(())
}

/// Read back a matrix written by [`write_transition_matrix`].
pub fn read_transition_matrix(path: &Path) -> Result<TransitionMatrix> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open transition matrix: {}", path.display()))?;

    let keys = reader
        .headers()?
        .iter()
        .map(|h| h.trim().parse::<StateKey>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid state key in header of {}", path.display()))?;

    let n = keys.len();
    let mut values = Vec::with_capacity(n * n);
    let mut rows = 0;
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", i + 1))?;
        if record.len() != n {
            bail!("Row {} has {} columns, expected {}", i + 1, record.len(), n);
        }
        for cell in record.iter() {
            let p: f64 = cell
                .trim()
                .parse()
                .with_context(|| format!("Row {}: '{}' is not a probability", i + 1, cell))?;
            values.push(p);
        }
        rows += 1;
    }

    let probs = DMatrix::from_row_slice(rows, n, &values);
    Ok(TransitionMatrix::from_parts(keys, probs)?)
}

/// Header = sorted opener keys, then a single row of probabilities.
pub fn write_initial_states(path: &Path, initial: &InitialStateDistribution) -> Result<()> {
    let distribution = initial.distribution();
    let mut w = writer(path)?;
    w.write_record(distribution.keys().map(ToString::to_string))?;
    w.write_record(distribution.values().map(ToString::to_string))?;
    w.flush()?;
    Ok(())
}

pub fn write_absorption(path: &Path, absorption: &AbsorptionResult) -> Result<()> {
    let mut w = writer(path)?;
    let mut header = vec!["state".to_string()];
    header.extend(Outcome::ALL.iter().map(|o| o.name().to_string()));
    w.write_record(&header)?;

    let m = absorption.matrix();
    for (i, key) in absorption.keys().iter().enumerate() {
        let mut row = vec![key.to_string()];
        row.extend((0..m.ncols()).map(|j| m[(i, j)].to_string()));
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

/// Rejected records with their original columns, for offline review.
pub fn write_malformed(path: &Path, errors: &[MalformedPlayError]) -> Result<()> {
    let columns: BTreeSet<&str> = errors
        .iter()
        .flat_map(|e| e.event.fields.keys().map(String::as_str))
        .collect();

    let mut w = writer(path)?;
    let mut header = vec!["source", "row", "field", "value"];
    header.extend(columns.iter().copied());
    w.write_record(&header)?;

    for err in errors {
        let mut row = vec![
            err.event.source.clone(),
            err.event.row.to_string(),
            err.field.to_string(),
            err.value.clone(),
        ];
        row.extend(columns.iter().map(|c| err.event.get(c).unwrap_or_default().to_string()));
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}
