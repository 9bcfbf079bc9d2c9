//! Relational access to the products table.
//!
//! A run only ever needs three statements: count the eligible rows, page
//! through them by id, and write cleaned names back. Each page runs inside a
//! [`PageTransaction`]; dropping one without calling `commit` rolls it back.

#[cfg(feature = "mysql")]
pub mod mysql;
pub mod sqlite;

use crate::config::{Backend, DatabaseConfig};
use crate::error::{CleanerError, Result};

#[cfg(feature = "mysql")]
pub use self::mysql::MySqlProductStore;
pub use self::sqlite::SqliteProductStore;

/// A row of the products table as the cleaner sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: i64,
    pub description: Option<String>,
    pub name: Option<String>,
}

/// `name := name` for the row with primary key `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameUpdate {
    pub name: String,
    pub id: i64,
}

pub trait ProductStore {
    /// Rows with a non-empty description and an empty or NULL name.
    fn count_eligible(&mut self) -> Result<u64>;

    /// Opens the transaction that one page is read and written in.
    fn begin_page(&mut self) -> Result<Box<dyn PageTransaction + '_>>;
}

pub trait PageTransaction {
    /// Up to `limit` eligible rows with `id > after_id`, ascending by id.
    fn fetch_after(&mut self, after_id: i64, limit: usize) -> Result<Vec<ProductRecord>>;

    /// Applies every update; returns the number of rows the database reports as changed.
    fn update_names(&mut self, batch: &[NameUpdate]) -> Result<usize>;

    fn commit(self: Box<Self>) -> Result<()>;
}

/// SQL text for one products table. `?` placeholders work for both backends.
#[derive(Debug, Clone)]
pub struct SqlQueries {
    pub count: String,
    pub page: String,
    pub update: String,
}

const ELIGIBLE: &str =
    "description IS NOT NULL AND description != '' AND (name IS NULL OR name = '')";

impl SqlQueries {
    /// `table` must already have passed [`crate::config::is_plain_identifier`].
    pub fn for_table(table: &str) -> Self {
        Self {
            count: format!("SELECT COUNT(*) FROM {table} WHERE {ELIGIBLE}"),
            page: format!(
                "SELECT id, description, name FROM {table} WHERE {ELIGIBLE} AND id > ? ORDER BY id LIMIT ?"
            ),
            update: format!("UPDATE {table} SET name = ? WHERE id = ?"),
        }
    }
}

/// Opens the single connection a run holds, for whichever backend is configured.
pub fn open(config: &DatabaseConfig) -> Result<Box<dyn ProductStore>> {
    if !crate::config::is_plain_identifier(&config.table) {
        return Err(CleanerError::Config(format!(
            "Table name '{}' must be a plain SQL identifier",
            config.table
        )));
    }

    match config.backend {
        Backend::Sqlite => Ok(Box::new(SqliteProductStore::open(
            &config.sqlite_path,
            &config.table,
        )?)),
        #[cfg(feature = "mysql")]
        Backend::Mysql => Ok(Box::new(MySqlProductStore::connect(config)?)),
        #[cfg(not(feature = "mysql"))]
        Backend::Mysql => Err(CleanerError::Config(
            "MySQL backend requested but this build lacks the `mysql` feature".to_string(),
        )),
    }
}
