//! Command-line interface for bookalign
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Align long-form ASR transcripts to reference books and cut training utterances
#[derive(Parser, Debug)]
#[command(
    name = "bookalign",
    version,
    about = "Align long-form ASR transcripts to reference books and cut training utterances"
)]
pub struct Cli {
    /// Input manifest (JSONL) with recognition results and book paths
    #[arg(long, value_name = "PATH")]
    pub manifest_in: PathBuf,

    /// Output manifest (JSONL) for the segmented cuts
    #[arg(long, value_name = "PATH")]
    pub manifest_out: PathBuf,

    /// Number of cuts in a batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Minimum segment duration. Examples: 2, 2s, 1500ms
    #[arg(long, value_name = "DURATION", value_parser = parse_seconds)]
    pub min_duration: Option<f64>,

    /// Maximum segment duration. Examples: 30, 30s, 1m
    #[arg(long, value_name = "DURATION", value_parser = parse_seconds)]
    pub max_duration: Option<f64>,

    /// Maximum per-segment alignment error rate
    #[arg(long, value_name = "RATE")]
    pub max_error_rate: Option<f64>,

    /// Threads for the alignment pool (0 = all cores, 1 = serial)
    #[arg(long, value_name = "N")]
    pub align_threads: Option<usize>,

    /// Threads for the splitting pool (0 = all cores, 1 = serial)
    #[arg(long, value_name = "N")]
    pub split_threads: Option<usize>,

    /// Suppress progress output (warnings only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (-v: stage progress, -vv: per-task detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(min_duration) = self.min_duration {
            config.split.min_duration = min_duration;
        }
        if let Some(max_duration) = self.max_duration {
            config.split.max_duration = max_duration;
        }
        if let Some(max_error_rate) = self.max_error_rate {
            config.split.max_error_rate = max_error_rate;
        }
        if let Some(align_threads) = self.align_threads {
            config.executor.align_threads = align_threads;
        }
        if let Some(split_threads) = self.split_threads {
            config.executor.split_threads = split_threads;
        }
    }
}

/// Parse a duration string into seconds.
///
/// Supports bare numbers (seconds) and any format accepted by `humantime`:
/// single-unit (`30s`, `2m`) and compound (`1m30s`).
fn parse_seconds(s: &str) -> Result<f64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<f64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs_f64())
        .map_err(|e| e.to_string())
}
