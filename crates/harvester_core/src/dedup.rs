use std::collections::HashSet;

use crate::ExtractedRecord;

/// Streaming admission set keyed by record id and by canonical source URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deduplicator {
    seen_ids: HashSet<String>,
    seen_urls: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers both keys and returns `true` only if neither was seen before.
    /// A record without any key is never admitted.
    pub fn admit(&mut self, record: &ExtractedRecord) -> bool {
        if !record.has_admission_key() || self.contains(record) {
            return false;
        }
        if !record.id.is_empty() {
            self.seen_ids.insert(record.id.clone());
        }
        if !record.source_url.is_empty() {
            self.seen_urls.insert(record.source_url.clone());
        }
        true
    }

    pub fn contains(&self, record: &ExtractedRecord) -> bool {
        (!record.id.is_empty() && self.seen_ids.contains(&record.id))
            || (!record.source_url.is_empty() && self.seen_urls.contains(&record.source_url))
    }

    pub fn seen_ids(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn seen_urls(&self) -> usize {
        self.seen_urls.len()
    }
}
