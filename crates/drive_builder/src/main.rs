//! Drive Builder CLI
//!
//! 경기 기록 CSV → 드라이브 마르코프 모델 산출물

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use drive_builder::{BuildOptions, InputEncoding};
#[cfg(feature = "cli")]
use drive_core::{ModelConfig, ZeroRowPolicy};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "drive_builder")]
#[command(about = "Build absorbing Markov chain models of offensive drives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build count, transition, initial-state and absorption matrices
    Build {
        /// Play-by-play CSV files, one game per file
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Model config YAML (defaults to $DRIVE_MODEL_CONFIG, then built-ins)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input encoding: utf8 or latin1
        #[arg(long, default_value = "latin1")]
        encoding: InputEncoding,

        /// Keep only this team's drives (segmented on the full game)
        #[arg(long)]
        offense: Option<String>,

        /// Zero-row policy: reject or exclude
        #[arg(long)]
        zero_rows: Option<ZeroRowPolicy>,

        /// Exclude malformed plays instead of failing the run
        #[arg(long, default_value = "false")]
        allow_malformed: bool,
    },

    /// Solve a saved transition matrix for absorption probabilities
    Solve {
        /// Transition matrix CSV written by `build`
        trans_csv: PathBuf,

        /// Output CSV path
        #[arg(long, default_value = "abs_prob.csv")]
        out: PathBuf,
    },

    /// Split a season file into one CSV per game
    Split {
        /// Season play-by-play CSV
        input: PathBuf,

        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,

        /// Column holding the game id
        #[arg(long, default_value = "gameid")]
        game_column: String,

        /// Input encoding: utf8 or latin1
        #[arg(long, default_value = "latin1")]
        encoding: InputEncoding,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            inputs,
            out_dir,
            config,
            encoding,
            offense,
            zero_rows,
            allow_malformed,
        } => {
            let mut config = match config {
                Some(path) => ModelConfig::from_path(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => ModelConfig::from_env_or_default()?,
            };
            if let Some(policy) = zero_rows {
                config.zero_row_policy = policy;
            }
            config.allow_malformed |= allow_malformed;
            if offense.is_some() {
                config.offense = offense;
            }

            tracing::info!(
                inputs = inputs.len(),
                out_dir = %out_dir.display(),
                %encoding,
                policy = %config.zero_row_policy,
                "Building drive model"
            );

            let options = BuildOptions {
                config,
                encoding,
                out_dir: out_dir.clone(),
            };
            let manifest = drive_builder::run_build(&inputs, &options)?;

            print_manifest(&manifest);
            tracing::info!("Artifacts written to {}", out_dir.display());
        }

        Commands::Solve { trans_csv, out } => {
            tracing::info!("Solving {}", trans_csv.display());
            let absorption = drive_builder::run_solve(&trans_csv, &out)?;
            tracing::info!(
                states = absorption.keys().len(),
                "Absorption matrix written to {}",
                out.display()
            );
        }

        Commands::Split {
            input,
            out_dir,
            game_column,
            encoding,
        } => {
            tracing::info!("Splitting {} by '{}'", input.display(), game_column);
            let written = drive_builder::split_games(&input, &out_dir, &game_column, encoding)?;
            for (path, rows) in &written {
                tracing::debug!("{}: {} rows", path.display(), rows);
            }
            tracing::info!("{} game files written to {}", written.len(), out_dir.display());
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_manifest(manifest: &drive_builder::RunManifest) {
    tracing::info!(
        events = manifest.events,
        filtered = manifest.filtered,
        plays = manifest.plays,
        drives = manifest.drives,
        states = manifest.states,
        "Model built"
    );
    if manifest.malformed > 0 {
        tracing::warn!("{} malformed play(s) excluded", manifest.malformed);
    }
    if !manifest.pruned_states.is_empty() {
        tracing::warn!("{} dangling state(s) pruned", manifest.pruned_states.len());
    }
    for input in &manifest.inputs {
        tracing::debug!("{} sha256={}", input.path, input.sha256);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("drive_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
