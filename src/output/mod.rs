//! Output module for persisting the product table
//!
//! This module handles:
//! - Writing the typed table to CSV, Google Sheets and SQLite
//! - Writing the optional raw snapshot of scraped records
//! - Summarizing a run once every sink has been attempted

mod csv_output;
mod sheets_output;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_output::CsvSink;
pub use sheets_output::{ServiceAccountKey, SheetsSink};
pub use sqlite_output::SqliteSink;
pub use stats::{print_summary, RunSummary};
pub use traits::{OutputError, OutputResult, Sink};

pub(crate) use sqlite_output::is_identifier;

use crate::config::OutputConfig;
use crate::record::{RawItemRecord, TypedRecord};
use reqwest::Client;
use std::path::Path;

/// Whether one sink accepted the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkResult {
    pub name: String,
    pub saved: bool,
}

/// The sinks enabled for a run
///
/// The CSV sink is always present; the spreadsheet and database sinks only
/// when their configuration sections are.
pub struct SinkSet {
    csv: CsvSink,
    sheets: Option<SheetsSink>,
    sqlite: Option<SqliteSink>,
}

impl SinkSet {
    /// Builds the sinks described by `config`
    ///
    /// `client` is shared by the network-backed sinks.
    pub fn from_config(config: &OutputConfig, client: Client) -> Self {
        Self {
            csv: CsvSink::new(&config.csv_path),
            sheets: config
                .sheets
                .as_ref()
                .map(|sheets| SheetsSink::new(client, sheets.clone())),
            sqlite: config.database.as_ref().map(SqliteSink::new),
        }
    }

    /// Offers `table` to every sink in turn
    ///
    /// A failing sink does not prevent the remaining ones from running.
    pub async fn persist_all(&self, table: &[TypedRecord]) -> Vec<SinkResult> {
        let mut results = Vec::with_capacity(3);

        results.push(persist_one(&self.csv, table).await);
        if let Some(sheets) = &self.sheets {
            results.push(persist_one(sheets, table).await);
        }
        if let Some(sqlite) = &self.sqlite {
            results.push(persist_one(sqlite, table).await);
        }

        results
    }
}

async fn persist_one<S: Sink>(sink: &S, table: &[TypedRecord]) -> SinkResult {
    SinkResult {
        name: sink.name().to_string(),
        saved: sink.persist(table).await,
    }
}

/// Writes the scraped records, untouched, as CSV
pub fn write_raw_snapshot(path: &Path, records: &[RawItemRecord]) -> OutputResult<()> {
    CsvSink::new(path).write_rows(records)?;
    tracing::info!("Raw snapshot of {} records saved to {}", records.len(), path.display());
    Ok(())
}
