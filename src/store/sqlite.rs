use rusqlite::{params, Connection, OpenFlags, Transaction};
use std::path::Path;
use tracing::info;

use super::{NameUpdate, PageTransaction, ProductRecord, ProductStore, SqlQueries};
use crate::error::{CleanerError, Result};

/// Products table in a SQLite database file.
pub struct SqliteProductStore {
    conn: Connection,
    queries: SqlQueries,
}

impl SqliteProductStore {
    /// Opens an existing database file; a missing file is a connection error.
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            CleanerError::connection(format!("Failed to open '{}': {e}", path.display()))
        })?;
        info!("Opened SQLite database at {}", path.display());
        Ok(Self::from_connection(conn, table))
    }

    pub fn open_in_memory(table: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CleanerError::connection(format!("Failed to open in-memory database: {e}")))?;
        Ok(Self::from_connection(conn, table))
    }

    pub fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            queries: SqlQueries::for_table(table),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ProductStore for SqliteProductStore {
    fn count_eligible(&mut self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&self.queries.count, [], |row| row.get(0))
            .map_err(|e| CleanerError::query(format!("Failed to count eligible rows: {e}")))?;
        Ok(count.max(0) as u64)
    }

    fn begin_page(&mut self) -> Result<Box<dyn PageTransaction + '_>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| CleanerError::transaction(format!("Failed to begin transaction: {e}")))?;
        Ok(Box::new(SqlitePage {
            tx,
            queries: &self.queries,
        }))
    }
}

struct SqlitePage<'conn> {
    tx: Transaction<'conn>,
    queries: &'conn SqlQueries,
}

impl PageTransaction for SqlitePage<'_> {
    fn fetch_after(&mut self, after_id: i64, limit: usize) -> Result<Vec<ProductRecord>> {
        let fetch_err = |e: rusqlite::Error| CleanerError::query(format!("Failed to fetch page after id {after_id}: {e}"));

        let mut stmt = self.tx.prepare_cached(&self.queries.page).map_err(fetch_err)?;
        let rows = stmt
            .query_map(params![after_id, limit as i64], |row| {
                Ok(ProductRecord {
                    id: row.get(0)?,
                    description: row.get(1)?,
                    name: row.get(2)?,
                })
            })
            .map_err(fetch_err)?;

        let records = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(fetch_err)?;
        Ok(records)
    }

    fn update_names(&mut self, batch: &[NameUpdate]) -> Result<usize> {
        let mut stmt = self
            .tx
            .prepare_cached(&self.queries.update)
            .map_err(|e| CleanerError::query(format!("Failed to prepare update: {e}")))?;

        let mut changed = 0;
        for update in batch {
            changed += stmt
                .execute(params![update.name, update.id])
                .map_err(|e| CleanerError::query(format!("Failed to update id {}: {e}", update.id)))?;
        }
        Ok(changed)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .map_err(|e| CleanerError::transaction(format!("Failed to commit page: {e}")))
    }
}
