use chrono::{DateTime, Utc};

use crate::recency::{classify, Freshness};
use crate::{Deduplicator, ExtractedRecord};

/// Authoritative pass over the collected records before they are handed to a sink.
///
/// Re-applies the recency cutoff and re-deduplicates, keeping discovery order.
pub fn authoritative_pass(
    records: impl IntoIterator<Item = ExtractedRecord>,
    cutoff: DateTime<Utc>,
) -> Vec<ExtractedRecord> {
    let mut dedup = Deduplicator::new();
    records
        .into_iter()
        .filter(|record| classify(record.timestamp, cutoff) == Freshness::Fresh)
        .filter(|record| dedup.admit(record))
        .collect()
}
