//! Write the [`CveRecord`]s as JSON
//! It serializes the records as an indented top-level array and writes
//! them to a file, replacing any previous contents.

use std::fs;
use std::path::PathBuf;

use log::trace;

use super::Writer;
use crate::models::CveRecord;

/// A writer to store the records as an indented JSON file.
pub struct JsonFileWriter {
    /// Where the JSON file is written.
    path: PathBuf,
}

impl JsonFileWriter {
    /// Creates a new JsonFileWriter targeting the given path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Writer for JsonFileWriter {
    /// Writes the records as a 2-space-indented JSON array.
    /// The file is written once, at the end of the run; there is no
    /// streaming or partial write.
    fn write(&self, records: &[CveRecord]) -> Result<(), String> {
        trace!("Running JsonFileWriter::write()");
        // serde_json::to_string_pretty() should never return Err, since
        // CveRecord derives Serialize.
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| format!("Unable to serialize the records: {:?}", e))?;
        fs::write(&self.path, json).map_err(|e| {
            format!(
                "Unable to write the file {}: {:?}",
                self.path.to_string_lossy(),
                e
            )
        })
    }
}
