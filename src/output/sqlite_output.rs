//! SQLite output
//!
//! Replaces the contents of one table with the typed product table. The
//! drop, create and inserts run in a single transaction, so a failed write
//! leaves the previous contents in place.

use crate::config::DatabaseConfig;
use crate::output::traits::{OutputError, OutputResult, Sink};
use crate::record::TypedRecord;
use rusqlite::{params, Connection, OpenFlags};

/// Relational sink
pub struct SqliteSink {
    uri: String,
    table_name: String,
}

impl SqliteSink {
    /// Creates a sink for `config.table_name` in the database at `config.uri`
    ///
    /// The table name must already be a plain identifier; configuration
    /// validation guarantees this for loaded configs.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            uri: config.uri.clone(),
            table_name: config.table_name.clone(),
        }
    }

    /// Opens the database by path or `file:` URI
    fn connect(&self) -> OutputResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        Ok(Connection::open_with_flags(&self.uri, flags)?)
    }

    fn replace_table(&self, conn: &mut Connection, table: &[TypedRecord]) -> OutputResult<()> {
        if !is_identifier(&self.table_name) {
            return Err(OutputError::Write(format!(
                "invalid table name '{}'",
                self.table_name
            )));
        }

        let tx = conn.transaction()?;

        tx.execute_batch(&format!(
            r#"
            DROP TABLE IF EXISTS "{table}";
            CREATE TABLE "{table}" (
                "Title" TEXT NOT NULL,
                "Price" REAL NOT NULL,
                "Rating" REAL NOT NULL,
                "Colors" INTEGER NOT NULL,
                "Size" TEXT NOT NULL,
                "Gender" TEXT NOT NULL,
                "timestamp" TEXT NOT NULL
            );
            "#,
            table = self.table_name
        ))?;

        {
            let mut stmt = tx.prepare(&format!(
                r#"INSERT INTO "{}" ("Title", "Price", "Rating", "Colors", "Size", "Gender", "timestamp")
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                self.table_name
            ))?;

            for record in table {
                stmt.execute(params![
                    record.title(),
                    record.price(),
                    record.rating(),
                    record.color_count(),
                    record.size(),
                    record.gender(),
                    record.captured_at_string(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

/// Whether `name` can be interpolated into DDL as a table name
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Sink for SqliteSink {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn write_table(&self, table: &[TypedRecord]) -> OutputResult<()> {
        let mut conn = self.connect()?;
        self.replace_table(&mut conn, table)
    }
}
