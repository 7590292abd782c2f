use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "harvester")]
#[command(about = "Collect recent records from a paginated JSON feed")]
#[command(version)]
pub struct Args {
    /// Feed endpoint; pages are requested as `<url>?page=N`
    #[arg(long)]
    pub feed_url: Option<String>,

    /// RON file with harvest settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for checkpoint.json and records.json
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Stop after this many unique records
    #[arg(long)]
    pub target: Option<usize>,

    /// Recency window in hours
    #[arg(long)]
    pub window_hours: Option<u64>,

    /// Seed the run from an existing checkpoint
    #[arg(long)]
    pub resume: bool,

    /// Fixed seed for pacing jitter
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
