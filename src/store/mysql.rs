use ::mysql::prelude::Queryable;
use ::mysql::{Conn, OptsBuilder, Transaction, TxOpts};
use tracing::info;

use super::{NameUpdate, PageTransaction, ProductRecord, ProductStore, SqlQueries};
use crate::config::DatabaseConfig;
use crate::error::{CleanerError, Result};

/// Products table on a MySQL server, over exactly one connection.
pub struct MySqlProductStore {
    conn: Conn,
    queries: SqlQueries,
}

impl MySqlProductStore {
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to MySQL at {}:{}/{} as {}",
            config.host, config.port, config.database, config.user
        );

        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()));

        let conn = Conn::new(opts)
            .map_err(|e| CleanerError::connection(format!("Failed to connect to MySQL: {e}")))?;

        Ok(Self {
            conn,
            queries: SqlQueries::for_table(&config.table),
        })
    }
}

impl ProductStore for MySqlProductStore {
    fn count_eligible(&mut self) -> Result<u64> {
        let count: Option<u64> = self
            .conn
            .query_first(self.queries.count.as_str())
            .map_err(|e| CleanerError::query(format!("Failed to count eligible rows: {e}")))?;
        Ok(count.unwrap_or(0))
    }

    fn begin_page(&mut self) -> Result<Box<dyn PageTransaction + '_>> {
        let tx = self
            .conn
            .start_transaction(TxOpts::default())
            .map_err(|e| CleanerError::transaction(format!("Failed to begin transaction: {e}")))?;
        Ok(Box::new(MySqlPage {
            tx,
            queries: &self.queries,
        }))
    }
}

struct MySqlPage<'conn> {
    tx: Transaction<'conn>,
    queries: &'conn SqlQueries,
}

impl PageTransaction for MySqlPage<'_> {
    fn fetch_after(&mut self, after_id: i64, limit: usize) -> Result<Vec<ProductRecord>> {
        let rows: Vec<(i64, Option<String>, Option<String>)> = self
            .tx
            .exec(self.queries.page.as_str(), (after_id, limit as u64))
            .map_err(|e| {
                CleanerError::query(format!("Failed to fetch page after id {after_id}: {e}"))
            })?;

        Ok(rows
            .into_iter()
            .map(|(id, description, name)| ProductRecord {
                id,
                description,
                name,
            })
            .collect())
    }

    fn update_names(&mut self, batch: &[NameUpdate]) -> Result<usize> {
        let mut changed = 0;
        for update in batch {
            self.tx
                .exec_drop(self.queries.update.as_str(), (update.name.as_str(), update.id))
                .map_err(|e| {
                    CleanerError::query(format!("Failed to update id {}: {e}", update.id))
                })?;
            changed += self.tx.affected_rows() as usize;
        }
        Ok(changed)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .map_err(|e| CleanerError::transaction(format!("Failed to commit page: {e}")))
    }
}
