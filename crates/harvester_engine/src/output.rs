//! Fixed row schema shared by checkpoints and the final output.
use chrono::SecondsFormat;
use harvester_core::{parse_timestamp, Engagement, ExtractedRecord};
use serde::{Deserialize, Serialize};

use crate::persist::PersistError;

const LIST_DELIMITER: char = ',';

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {index}: unparseable timestamp {value:?}")]
    InvalidTimestamp { index: usize, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    pub id: String,
    pub timestamp: String,
    pub text: String,
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
    pub tags: String,
    pub mentions: String,
    pub source_url: String,
}

impl From<&ExtractedRecord> for RecordRow {
    fn from(record: &ExtractedRecord) -> Self {
        let delimiter = LIST_DELIMITER.to_string();
        Self {
            id: record.id.clone(),
            timestamp: record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            text: record.text.clone(),
            likes: record.engagement.likes,
            reposts: record.engagement.reposts,
            replies: record.engagement.replies,
            tags: record.tags.join(&delimiter),
            mentions: record.mentions.join(&delimiter),
            source_url: record.source_url.clone(),
        }
    }
}

impl RecordRow {
    fn into_record(self, index: usize) -> Result<ExtractedRecord, OutputError> {
        let timestamp =
            parse_timestamp(&self.timestamp).ok_or_else(|| OutputError::InvalidTimestamp {
                index,
                value: self.timestamp.clone(),
            })?;
        Ok(ExtractedRecord {
            id: self.id,
            timestamp,
            text: self.text,
            engagement: Engagement {
                likes: self.likes,
                reposts: self.reposts,
                replies: self.replies,
            },
            tags: split_list(&self.tags),
            mentions: split_list(&self.mentions),
            source_url: self.source_url,
        })
    }
}

fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

pub fn encode_rows(records: &[ExtractedRecord]) -> Result<Vec<u8>, OutputError> {
    let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
    Ok(serde_json::to_vec_pretty(&rows)?)
}

pub fn decode_rows(bytes: &[u8]) -> Result<Vec<ExtractedRecord>, OutputError> {
    let rows: Vec<RecordRow> = serde_json::from_slice(bytes)?;
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| row.into_record(index))
        .collect()
}
