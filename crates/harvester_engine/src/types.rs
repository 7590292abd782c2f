use std::fmt;

use harvester_core::{ConfigError, ExtractedRecord, StopReason};

use crate::output::OutputError;
use crate::source::SourceError;

/// Why the HTTP feed currently counts as unhealthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFailure {
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidBody(String),
}

impl fmt::Display for FeedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFailure::HttpStatus(code) => write!(f, "http status {code}"),
            FeedFailure::Timeout => write!(f, "timeout"),
            FeedFailure::Network => write!(f, "network error"),
            FeedFailure::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FeedFailure::InvalidBody(message) => write!(f, "invalid feed body: {message}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("content source failed: {0}")]
    Source(#[from] SourceError),
    #[error("output failed: {0}")]
    Output(#[from] OutputError),
}

/// Outcome of a completed harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub reason: StopReason,
    pub rounds: u64,
    /// Records admitted during the run, before the final pass.
    pub collected: usize,
    pub stale_hits: u64,
    /// Records that survived the authoritative recency and dedup pass.
    pub final_records: Vec<ExtractedRecord>,
}
