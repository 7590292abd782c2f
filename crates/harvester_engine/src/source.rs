use harvester_core::RawItem;
use thiserror::Error;

/// Failures a content source cannot express as "unhealthy". These end the run
/// through the unexpected-failure path.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid source url: {0}")]
    InvalidUrl(String),
    #[error("source client error: {0}")]
    Client(String),
    #[error("source failure: {0}")]
    Other(String),
}

/// The external collaborator that renders the feed.
///
/// `current_batch` returns the visible items oldest to newest. A source that
/// shows a transient failure surface reports `healthy() == false` rather than
/// returning an error.
#[async_trait::async_trait]
pub trait ContentSource: Send {
    type Item: RawItem + Send + Sync;

    async fn current_batch(&mut self) -> Result<Vec<Self::Item>, SourceError>;

    async fn advance(&mut self) -> Result<(), SourceError>;

    async fn healthy(&mut self) -> Result<bool, SourceError>;

    async fn refresh(&mut self) -> Result<(), SourceError>;
}
