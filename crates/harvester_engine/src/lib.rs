//! Harvester engine: content sources, the harvest loop and durable output.
mod checkpoint;
mod feed;
mod harvest;
mod output;
mod persist;
mod sink;
mod source;
mod types;

pub use checkpoint::{CheckpointStore, JsonCheckpointStore};
pub use feed::{FeedItem, FeedSettings, HttpFeedSource};
pub use harvest::{Clock, Harvester};
pub use output::{decode_rows, encode_rows, OutputError, RecordRow};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use sink::{JsonFileSink, RecordSink};
pub use source::{ContentSource, SourceError};
pub use types::{FeedFailure, HarvestError, HarvestReport};
