use std::path::{Path, PathBuf};

use harvester_core::ExtractedRecord;

use crate::output::{decode_rows, encode_rows, OutputError};
use crate::persist::AtomicFileWriter;

/// Durable snapshot of everything admitted so far.
pub trait CheckpointStore: Send {
    /// Replaces the previous checkpoint with `records`.
    fn save(&mut self, records: &[ExtractedRecord]) -> Result<(), OutputError>;

    /// The last saved checkpoint; empty if none exists.
    fn load(&self) -> Result<Vec<ExtractedRecord>, OutputError>;
}

#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    writer: AtomicFileWriter,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn save(&mut self, records: &[ExtractedRecord]) -> Result<(), OutputError> {
        let bytes = encode_rows(records)?;
        self.writer.write(&bytes)?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<ExtractedRecord>, OutputError> {
        match self.writer.read()? {
            Some(bytes) => decode_rows(&bytes),
            None => Ok(Vec::new()),
        }
    }
}
