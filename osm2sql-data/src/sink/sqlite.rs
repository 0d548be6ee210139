//! SQLite sink writing the five OSM tables inside a single transaction.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use osm2sql_core::{Cell, Row, Table};
use rusqlite::Connection;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};

use super::{RowSink, SinkError, SinkSummary};
use crate::fs;

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS nodes (
        id TEXT NOT NULL,
        lat TEXT NOT NULL,
        lon TEXT NOT NULL,
        user TEXT NOT NULL,
        uid TEXT NOT NULL,
        version TEXT NOT NULL,
        changeset TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS nodes_tags (
        id TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        type TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS ways (
        id TEXT NOT NULL,
        user TEXT NOT NULL,
        uid TEXT NOT NULL,
        version TEXT NOT NULL,
        changeset TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS ways_nodes (
        id TEXT NOT NULL,
        node_id TEXT NOT NULL,
        position INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS ways_tags (
        id TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        type TEXT NOT NULL
    );
";

const fn insert_sql(table: Table) -> &'static str {
    match table {
        Table::Nodes => {
            "INSERT INTO nodes (id, lat, lon, user, uid, version, changeset, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        }
        Table::NodesTags => "INSERT INTO nodes_tags (id, key, value, type) VALUES (?1, ?2, ?3, ?4)",
        Table::Ways => {
            "INSERT INTO ways (id, user, uid, version, changeset, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        }
        Table::WaysNodes => "INSERT INTO ways_nodes (id, node_id, position) VALUES (?1, ?2, ?3)",
        Table::WaysTags => "INSERT INTO ways_tags (id, key, value, type) VALUES (?1, ?2, ?3, ?4)",
    }
}

/// Sink appending rows to an SQLite database.
///
/// Opening the sink creates missing parent directories and tables, then
/// begins a transaction. Appended rows stay invisible to other connections
/// until [`RowSink::commit`]. Dropping the sink without committing closes the
/// connection, which rolls the transaction back. Existing rows are kept:
/// repeated conversions append.
#[derive(Debug)]
pub struct SqliteSink {
    connection: Connection,
    path: Utf8PathBuf,
    summary: SinkSummary,
}

impl SqliteSink {
    /// Open or create the database at `path` and begin a transaction.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the directory, database, tables or
    /// transaction cannot be set up.
    pub fn open(path: &Utf8Path) -> Result<Self, SinkError> {
        fs::ensure_parent_dir(path).map_err(|source| SinkError::CreateDirectory {
            path: path.parent().unwrap_or(path).to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::begin(connection, path.to_path_buf())
    }

    /// Sink over a private in-memory database, mainly for tests.
    ///
    /// # Errors
    /// See [`SqliteSink::open`].
    pub fn open_in_memory() -> Result<Self, SinkError> {
        let path = Utf8PathBuf::from(":memory:");
        let connection = Connection::open_in_memory().map_err(|source| SinkError::Open {
            path: path.clone(),
            source,
        })?;
        Self::begin(connection, path)
    }

    fn begin(connection: Connection, path: Utf8PathBuf) -> Result<Self, SinkError> {
        connection
            .execute_batch(CREATE_TABLES)
            .map_err(|source| SinkError::CreateSchema { source })?;
        connection
            .execute_batch("BEGIN")
            .map_err(|source| SinkError::BeginTransaction { source })?;
        Ok(Self {
            connection,
            path,
            summary: SinkSummary::default(),
        })
    }

    /// Database path, or `:memory:`.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Rows appended in the open transaction.
    #[must_use]
    pub const fn pending(&self) -> SinkSummary {
        self.summary
    }
}

impl RowSink for SqliteSink {
    type Output = SinkSummary;

    fn append(&mut self, row: Row<'_>) -> Result<(), SinkError> {
        let table = row.table();
        let params = row
            .cells()
            .into_iter()
            .map(|cell| to_sql(table, cell))
            .collect::<Result<Vec<_>, _>>()?;
        let mut statement = self
            .connection
            .prepare_cached(insert_sql(table))
            .map_err(|source| SinkError::PrepareInsert { table, source })?;
        statement
            .execute(rusqlite::params_from_iter(params))
            .map_err(|source| SinkError::InsertRow { table, source })?;
        self.summary.record(table);
        Ok(())
    }

    fn commit(self) -> Result<Self::Output, SinkError> {
        self.connection
            .execute_batch("COMMIT")
            .map_err(|source| SinkError::Commit { source })?;
        info!(
            "committed {} rows to {}",
            self.summary.total(),
            self.path
        );
        Ok(self.summary)
    }
}

fn to_sql(table: Table, cell: Cell<'_>) -> Result<ToSqlOutput<'_>, SinkError> {
    match cell {
        Cell::Text(text) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes()))),
        Cell::Integer(value) => i64::try_from(value)
            .map(|value| ToSqlOutput::Owned(Value::Integer(value)))
            .map_err(|_| SinkError::IntegerOutOfRange { table, value }),
    }
}
