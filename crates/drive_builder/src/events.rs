//! Play-by-play CSV ingestion
//!
//! Season exports are ISO-8859-1 (`\xa0` shows up in blank descriptions),
//! so rows are read as bytes and decoded explicitly.
//!
//! - `read_events`: one game file → ordered `RawEvent`s
//! - `split_games`: one season file → one file per game id, bytes untouched

use anyhow::{Context, Result};
use drive_core::RawEvent;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Text encoding of input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputEncoding {
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value
    #[default]
    Latin1,
}

impl InputEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            InputEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            InputEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

impl fmt::Display for InputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputEncoding::Utf8 => write!(f, "utf8"),
            InputEncoding::Latin1 => write!(f, "latin1"),
        }
    }
}

impl FromStr for InputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "").as_str() {
            "utf8" => Ok(InputEncoding::Utf8),
            "latin1" | "iso88591" => Ok(InputEncoding::Latin1),
            other => Err(format!("unknown encoding '{}' (expected utf8 or latin1)", other)),
        }
    }
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read one play-by-play CSV (header row required) in file order.
pub fn read_events(path: &Path, encoding: InputEncoding) -> Result<Vec<RawEvent>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let header: Vec<String> = reader
        .byte_headers()
        .with_context(|| format!("Failed to read header: {}", path.display()))?
        .iter()
        .map(|h| encoding.decode(h).trim().to_string())
        .collect();

    let source = source_label(path);
    let mut events = Vec::new();

    for (i, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read row {} of {}", i + 1, path.display()))?;
        let fields: BTreeMap<String, String> = header
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), encoding.decode(v)))
            .collect();
        events.push(RawEvent::new(source.clone(), i + 1, fields));
    }

    log::debug!("Read {} rows from {}", events.len(), path.display());
    Ok(events)
}

/// Split a season file into one CSV per value of `game_column`.
///
/// Each output keeps the original header and the rows' original bytes.
/// Returns `(path, rows)` per written file, in order of first appearance.
pub fn split_games(
    input: &Path,
    out_dir: &Path,
    game_column: &str,
    encoding: InputEncoding,
) -> Result<Vec<(PathBuf, usize)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("Failed to open CSV file: {}", input.display()))?;

    let header = reader.byte_headers()?.clone();
    let column = header
        .iter()
        .position(|h| encoding.decode(h).trim() == game_column)
        .with_context(|| format!("Column '{}' not found in {}", game_column, input.display()))?;

    let mut order: Vec<String> = Vec::new();
    let mut games: BTreeMap<String, Vec<csv::ByteRecord>> = BTreeMap::new();
    for record in reader.byte_records() {
        let record = record?;
        let game = encoding.decode(record.get(column).unwrap_or_default()).trim().to_string();
        if game.is_empty() {
            continue;
        }
        if !games.contains_key(&game) {
            order.push(game.clone());
        }
        games.entry(game).or_default().push(record);
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(order.len());
    for game in order {
        let rows = &games[&game];
        let path = out_dir.join(format!("{}.csv", sanitize_file_stem(&game)));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_byte_record(&header)?;
        for row in rows {
            writer.write_byte_record(row)?;
        }
        writer.flush()?;
        written.push((path, rows.len()));
    }

    Ok(written)
}

/// Game ids look like `20130905_BAL@DEN`; keep them readable but path-safe.
fn sanitize_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}
