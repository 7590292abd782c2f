//! Harvester core: record extraction, admission and the pure resilience state machine.
mod config;
mod dedup;
mod effect;
mod extract;
mod filter;
mod finalize;
mod msg;
mod normalize;
mod pacing;
mod recency;
mod record;
mod state;
mod update;
mod view_model;

pub use config::{ConfigError, HarvestConfig, RecoveryPolicy, ThrottlePolicy};
pub use dedup::Deduplicator;
pub use effect::{CooldownReason, Effect, RefreshReason};
pub use extract::{
    parse_timestamp, Extraction, FieldExtractor, Metric, RawItem, RecordExtractor, RejectReason,
};
pub use filter::{AcceptAll, BlockedTerms, ContentFilter};
pub use finalize::authoritative_pass;
pub use msg::{Msg, RoundTally};
pub use normalize::{
    canonical_url, extract_mentions, extract_tags, id_from_url, normalize_text, parse_count,
};
pub use pacing::{DelayRange, PacingController, PacingTiers, BUSY_THRESHOLD, STEADY_THRESHOLD};
pub use recency::{classify, Freshness, RecencyWindow};
pub use record::{Engagement, ExtractedRecord};
pub use state::{HarvestState, Phase, StopReason};
pub use update::update;
pub use view_model::HarvestView;
