//! Resumable batched cleanup of the products table.
//!
//! Rows are paged by primary key with a high-water-mark cursor. A row drops
//! out of the eligible set once its name is written, so a rerun after a
//! failure only sees what is left.

use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::error::{CleanerError, Result};
use crate::metrics::RunnerMetrics;
use crate::normalize::normalize;
use crate::store::{NameUpdate, ProductRecord, ProductStore};

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Eligible rows counted before the first page.
    pub total_eligible: u64,
    pub processed: u64,
    pub updated: u64,
    /// Committed non-empty pages.
    pub pages: u64,
}

/// Snapshot handed to the progress observer after each committed page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub page: u64,
    pub last_id: i64,
    pub processed: u64,
    pub updated: u64,
    pub total_eligible: u64,
}

impl Progress {
    /// Share of the initially counted rows processed so far; `None` when nothing was counted.
    pub fn percent(&self) -> Option<f64> {
        if self.total_eligible == 0 {
            None
        } else {
            Some(self.processed as f64 / self.total_eligible as f64 * 100.0)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    page_size: NonZeroUsize,
}

impl BatchRunner {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn run<S>(&self, store: &mut S) -> Result<RunSummary>
    where
        S: ProductStore + ?Sized,
    {
        self.run_with(store, |_| {})
    }

    /// Like [`BatchRunner::run`], calling `on_page` after every committed page.
    #[instrument(skip(self, store, on_page), fields(page_size = self.page_size.get()))]
    pub fn run_with<S, F>(&self, store: &mut S, on_page: F) -> Result<RunSummary>
    where
        S: ProductStore + ?Sized,
        F: FnMut(&Progress),
    {
        let started = Instant::now();
        match self.run_pages(store, on_page) {
            Ok(summary) => {
                info!(
                    processed = summary.processed,
                    updated = summary.updated,
                    pages = summary.pages,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Name cleanup finished"
                );
                Ok(summary)
            }
            Err(e) => {
                RunnerMetrics::record_run_failed();
                error!("Name cleanup aborted: {}", e);
                Err(e)
            }
        }
    }

    fn run_pages<S, F>(&self, store: &mut S, mut on_page: F) -> Result<RunSummary>
    where
        S: ProductStore + ?Sized,
        F: FnMut(&Progress),
    {
        let total_eligible = store.count_eligible()?;
        info!(total = total_eligible, "Starting name cleanup");

        let mut summary = RunSummary {
            total_eligible,
            ..RunSummary::default()
        };
        let mut last_id: i64 = 0;

        loop {
            let page_started = Instant::now();
            let mut page = store.begin_page()?;
            let records = page.fetch_after(last_id, self.page_size.get())?;
            if records.is_empty() {
                debug!(last_id, "No rows after cursor");
                break;
            }

            let (batch, cursor) = clean_page(&records, last_id)?;
            if !batch.is_empty() {
                let changed = page.update_names(&batch)?;
                debug!(queued = batch.len(), changed, "Applied name updates");
            }
            page.commit()?;

            last_id = cursor;
            summary.pages += 1;
            summary.processed += records.len() as u64;
            summary.updated += batch.len() as u64;
            RunnerMetrics::record_page(
                records.len(),
                batch.len(),
                page_started.elapsed().as_secs_f64(),
            );

            let progress = Progress {
                page: summary.pages,
                last_id,
                processed: summary.processed,
                updated: summary.updated,
                total_eligible,
            };
            debug!(
                page = progress.page,
                last_id,
                processed = progress.processed,
                updated = progress.updated,
                "Committed page"
            );
            on_page(&progress);

            if records.len() < self.page_size.get() {
                break;
            }
        }

        Ok(summary)
    }
}

/// Cleans every record of a page. Returns the updates to write and the new
/// cursor, which is the last id seen whether or not that row produced a name.
fn clean_page(records: &[ProductRecord], last_id: i64) -> Result<(Vec<NameUpdate>, i64)> {
    let mut batch = Vec::with_capacity(records.len());
    let mut cursor = last_id;

    for record in records {
        if record.id <= cursor {
            return Err(CleanerError::query(format!(
                "page returned id {} at or before cursor {}",
                record.id, cursor
            )));
        }
        cursor = record.id;

        let cleaned = record.description.as_deref().map(normalize).unwrap_or_default();
        if !cleaned.is_empty() {
            batch.push(NameUpdate {
                name: cleaned,
                id: record.id,
            });
        }
    }

    Ok((batch, cursor))
}
