//! CSV output
//!
//! Writes records as comma-separated text with a header row and no index
//! column. Used both for the cleaned table and for the raw snapshot.

use crate::output::traits::{OutputResult, Sink};
use crate::record::TypedRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Flat-file sink
pub struct CsvSink {
    path: PathBuf,
    name: String,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("CSV {}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes any serializable rows, headers taken from the field names
    ///
    /// The file is replaced; an empty slice produces an empty file.
    pub fn write_rows<T: Serialize>(&self, rows: &[T]) -> OutputResult<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Sink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write_table(&self, table: &[TypedRecord]) -> OutputResult<()> {
        if table.is_empty() {
            // Header only, so the file still describes its columns
            let mut writer = csv::Writer::from_path(&self.path)?;
            writer.write_record(TypedRecord::HEADERS)?;
            writer.flush()?;
            return Ok(());
        }

        self.write_rows(table)
    }
}
