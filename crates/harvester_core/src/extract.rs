use chrono::{DateTime, NaiveDateTime, Utc};

use crate::normalize::{
    canonical_url, extract_mentions, extract_tags, id_from_url, normalize_text, parse_count,
};
use crate::recency::{classify, Freshness};
use crate::{Engagement, ExtractedRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Likes,
    Reposts,
    Replies,
}

/// Read-only view of one visible unit handed over by a content source.
///
/// All values are raw display strings; the extractor does the parsing.
pub trait RawItem {
    fn timestamp(&self) -> Option<&str>;
    fn text(&self) -> Option<&str>;
    fn engagement(&self, metric: Metric) -> Option<&str>;
    fn id(&self) -> Option<&str> {
        None
    }
    fn permalink(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingTimestamp,
    UnparseableTimestamp,
    MissingText,
    MissingKeys,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Fresh(ExtractedRecord),
    Stale,
    Rejected(RejectReason),
}

pub trait RecordExtractor: Send + Sync {
    fn extract(&self, item: &dyn RawItem, cutoff: DateTime<Utc>) -> Extraction;
}

/// Default extractor working purely on the [`RawItem`] accessors.
///
/// Checks run in order: timestamp, recency, text, admission keys. A stale item
/// is reported as `Stale` even when other fields are missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldExtractor;

impl RecordExtractor for FieldExtractor {
    fn extract(&self, item: &dyn RawItem, cutoff: DateTime<Utc>) -> Extraction {
        let raw_ts = match item.timestamp().map(str::trim) {
            Some(ts) if !ts.is_empty() => ts,
            _ => return Extraction::Rejected(RejectReason::MissingTimestamp),
        };
        let Some(timestamp) = parse_timestamp(raw_ts) else {
            return Extraction::Rejected(RejectReason::UnparseableTimestamp);
        };
        if classify(timestamp, cutoff) == Freshness::Stale {
            return Extraction::Stale;
        }

        let text = normalize_text(item.text().unwrap_or_default());
        if text.is_empty() {
            return Extraction::Rejected(RejectReason::MissingText);
        }

        let source_url = canonical_url(item.permalink().unwrap_or_default());
        let id = match item.id().map(normalize_text) {
            Some(id) if !id.is_empty() => id,
            _ => id_from_url(&source_url),
        };
        if id.is_empty() && source_url.is_empty() {
            return Extraction::Rejected(RejectReason::MissingKeys);
        }

        let count = |metric: Metric| {
            parse_count(&normalize_text(item.engagement(metric).unwrap_or_default()))
        };
        Extraction::Fresh(ExtractedRecord {
            engagement: Engagement {
                likes: count(Metric::Likes),
                reposts: count(Metric::Reposts),
                replies: count(Metric::Replies),
            },
            tags: extract_tags(&text),
            mentions: extract_mentions(&text),
            id,
            timestamp,
            text,
            source_url,
        })
    }
}

/// RFC 3339 first; a timestamp without offset is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
