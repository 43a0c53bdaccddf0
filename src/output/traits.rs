//! Sink traits and types
//!
//! This module defines the trait interface every persistence target
//! implements, and the errors they report.

use crate::record::TypedRecord;
use thiserror::Error;

/// Errors that can occur while persisting a table
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A persistence target for the typed product table
///
/// Sinks are independent and best-effort: [`Sink::persist`] never fails, it
/// logs and reports `false` so the caller can move on to the next sink.
#[allow(async_fn_in_trait)]
pub trait Sink {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Writes the whole table, replacing whatever the target held before
    async fn write_table(&self, table: &[TypedRecord]) -> OutputResult<()>;

    /// Writes the table and reports whether it succeeded
    async fn persist(&self, table: &[TypedRecord]) -> bool {
        match self.write_table(table).await {
            Ok(()) => {
                tracing::info!("Saved {} rows to {}", table.len(), self.name());
                true
            }
            Err(e) => {
                tracing::error!("Failed to save to {}: {}", self.name(), e);
                false
            }
        }
    }
}
