use std::path::{Path, PathBuf};

use harvester_core::ExtractedRecord;

use crate::output::{encode_rows, OutputError};
use crate::persist::AtomicFileWriter;

/// Receives the final record set after the authoritative pass.
pub trait RecordSink: Send {
    fn write(&mut self, records: &[ExtractedRecord]) -> Result<(), OutputError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    writer: AtomicFileWriter,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }
}

impl RecordSink for JsonFileSink {
    fn write(&mut self, records: &[ExtractedRecord]) -> Result<(), OutputError> {
        let bytes = encode_rows(records)?;
        self.writer.write(&bytes)?;
        Ok(())
    }
}
