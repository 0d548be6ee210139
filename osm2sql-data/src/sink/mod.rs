//! Row sinks: append rows in order, then commit once.

use std::io;

use camino::Utf8PathBuf;
use osm2sql_core::{Row, Table};
use rusqlite::Error as SqliteError;
use thiserror::Error;

mod memory;
mod sqlite;

pub use memory::{MemorySink, TabularOutput};
pub use sqlite::SqliteSink;

/// Two-phase destination for table rows.
///
/// Rows of each table keep the order in which they were appended. Nothing is
/// durable until [`RowSink::commit`] succeeds; `commit` consumes the sink so
/// it cannot run twice or race an `append`.
pub trait RowSink {
    /// Value handed back by a successful commit.
    type Output;

    /// Append one row.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the row cannot be buffered or written.
    fn append(&mut self, row: Row<'_>) -> Result<(), SinkError>;

    /// Make every appended row durable.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the commit fails; no rows are kept then.
    fn commit(self) -> Result<Self::Output, SinkError>;
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSummary {
    /// Rows in `nodes`.
    pub nodes: u64,
    /// Rows in `nodes_tags`.
    pub nodes_tags: u64,
    /// Rows in `ways`.
    pub ways: u64,
    /// Rows in `ways_nodes`.
    pub ways_nodes: u64,
    /// Rows in `ways_tags`.
    pub ways_tags: u64,
}

impl SinkSummary {
    /// Count one more row in `table`.
    pub fn record(&mut self, table: Table) {
        *self.slot(table) += 1;
    }

    /// Rows counted for `table`.
    #[must_use]
    pub const fn count(&self, table: Table) -> u64 {
        match table {
            Table::Nodes => self.nodes,
            Table::NodesTags => self.nodes_tags,
            Table::Ways => self.ways,
            Table::WaysNodes => self.ways_nodes,
            Table::WaysTags => self.ways_tags,
        }
    }

    /// Rows counted across all tables.
    #[must_use]
    pub fn total(&self) -> u64 {
        Table::ALL.iter().map(|table| self.count(*table)).sum()
    }

    fn slot(&mut self, table: Table) -> &mut u64 {
        match table {
            Table::Nodes => &mut self.nodes,
            Table::NodesTags => &mut self.nodes_tags,
            Table::Ways => &mut self.ways,
            Table::WaysNodes => &mut self.ways_nodes,
            Table::WaysTags => &mut self.ways_tags,
        }
    }
}

/// Errors raised by row sinks. None of them are retried.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the tables failed.
    #[error("failed to create the OSM tables")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin conversion transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing an insert statement failed.
    #[error("failed to prepare insert statement for {table}")]
    PrepareInsert {
        /// Table the statement targets.
        table: Table,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a row failed.
    #[error("failed to insert row into {table}")]
    InsertRow {
        /// Table the row belongs to.
        table: Table,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// An integer cell does not fit an SQLite integer.
    #[error("value {value} in {table} exceeds SQLite i64 range")]
    IntegerOutOfRange {
        /// Table the row belongs to.
        table: Table,
        /// Value that failed the conversion.
        value: u64,
    },
    /// Committing the transaction failed.
    #[error("failed to commit conversion transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn summary_counts_per_table() {
        let mut summary = SinkSummary::default();
        summary.record(Table::Nodes);
        summary.record(Table::NodesTags);
        summary.record(Table::NodesTags);
        summary.record(Table::WaysNodes);

        assert_eq!(summary.count(Table::Nodes), 1);
        assert_eq!(summary.count(Table::NodesTags), 2);
        assert_eq!(summary.count(Table::Ways), 0);
        assert_eq!(summary.count(Table::WaysNodes), 1);
        assert_eq!(summary.total(), 4);
    }
}
