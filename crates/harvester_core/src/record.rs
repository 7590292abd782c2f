use chrono::{DateTime, Utc};

/// Engagement counters shown next to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Engagement {
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
}

/// A normalized record that passed extraction.
///
/// `id` and `source_url` are both admission keys; extraction guarantees at
/// least one of them is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub engagement: Engagement,
    /// Hashtags without the leading `#`, in order of first occurrence.
    pub tags: Vec<String>,
    /// Mentions without the leading `@`, in order of first occurrence.
    pub mentions: Vec<String>,
    pub source_url: String,
}

impl ExtractedRecord {
    pub fn has_admission_key(&self) -> bool {
        !self.id.is_empty() || !self.source_url.is_empty()
    }
}
