//! Drive Builder Library
//!
//! 경기 기록 CSV → 드라이브 마르코프 모델 산출물 빌더
//!
//! - `build`: play-by-play files → count / transition / initial / absorption CSVs
//! - `solve`: transition CSV → absorption CSV
//! - `split`: season file → one file per game

pub mod artifacts;
pub mod events;

use anyhow::{Context, Result};
use drive_core::{AbsorptionResult, ModelBuilder, ModelConfig, RunReport, StateKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use events::{read_events, split_games, InputEncoding};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("No input files given")]
    NoInputs,
}

/// Options of one `build` run.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub config: ModelConfig,
    pub encoding: InputEncoding,
    pub out_dir: PathBuf,
}

/// 입력 파일 정보
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputDigest {
    pub path: String,
    /// SHA256 체크섬 (hex 문자열)
    pub sha256: String,
    pub rows: usize,
}

/// 실행 메타데이터
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub tool_version: String,
    /// 생성 시각 (RFC3339 형식)
    pub created_at: String,
    pub encoding: String,
    pub offense: Option<String>,
    pub zero_row_policy: String,
    pub inputs: Vec<InputDigest>,
    pub events: usize,
    pub filtered: usize,
    pub plays: usize,
    pub drives: usize,
    pub malformed: usize,
    pub states: usize,
    pub pruned_states: Vec<StateKey>,
}

impl RunManifest {
    fn new(options: &BuildOptions, inputs: Vec<InputDigest>, report: &RunReport, states: usize) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            encoding: options.encoding.to_string(),
            offense: options.config.offense.clone(),
            zero_row_policy: options.config.zero_row_policy.to_string(),
            inputs,
            events: report.events,
            filtered: report.filtered,
            plays: report.plays,
            drives: report.drives,
            malformed: report.malformed_count(),
            states,
            pruned_states: report.pruned_states.clone(),
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Run the whole model over `inputs` and write every artifact to
/// `options.out_dir`.
///
/// Each input is one batch: drives never span files. Rejected records are
/// written to `malformed.csv` before the run decides whether to fail.
pub fn run_build(inputs: &[PathBuf], options: &BuildOptions) -> Result<RunManifest> {
    if inputs.is_empty() {
        return Err(UsageError::NoInputs.into());
    }

    let out_dir = &options.out_dir;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut builder = ModelBuilder::new(options.config.clone());
    let mut digests = Vec::with_capacity(inputs.len());

    for input in inputs {
        let bytes =
            fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
        let events = read_events(input, options.encoding)?;
        let rows = events.len();
        builder.add_events(&events);

        log::debug!("Ingested {} ({} rows)", input.display(), rows);
        digests.push(InputDigest {
            path: input.display().to_string(),
            sha256: sha256_hex(&bytes),
            rows,
        });
    }

    let malformed = &builder.report().malformed;
    if !malformed.is_empty() {
        artifacts::write_malformed(&out_dir.join(artifacts::MALFORMED_FILE), malformed)?;
    }

    let model = builder.build().context("Model build failed")?;

    artifacts::write_count_matrix(&out_dir.join(artifacts::COUNTS_FILE), &model.counts)?;
    artifacts::write_transition_matrix(&out_dir.join(artifacts::TRANSITION_FILE), &model.transition)?;
    artifacts::write_initial_states(&out_dir.join(artifacts::INITIAL_FILE), &model.initial)?;
    artifacts::write_absorption(&out_dir.join(artifacts::ABSORPTION_FILE), &model.absorption)?;

    let manifest = RunManifest::new(options, digests, &model.report, model.counts.len());
    save_manifest(&out_dir.join(MANIFEST_FILE), &manifest)?;

    Ok(manifest)
}

/// Solve a saved transition matrix and write the absorption matrix to `out`.
pub fn run_solve(trans_csv: &Path, out: &Path) -> Result<AbsorptionResult> {
    let trans = artifacts::read_transition_matrix(trans_csv)?;
    trans.ensure_stochastic()?;
    let absorption = AbsorptionResult::solve(&trans)
        .with_context(|| format!("Failed to solve {}", trans_csv.display()))?;

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    artifacts::write_absorption(out, &absorption)?;
    Ok(absorption)
}

pub fn save_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    fs::write(path, json).with_context(|| format!("Failed to write manifest: {}", path.display()))?;
    Ok(())
}

pub fn load_manifest(path: &Path) -> Result<RunManifest> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse manifest")
}
