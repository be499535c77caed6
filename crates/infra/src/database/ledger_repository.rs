//! SQLite-backed transaction ledger.
//!
//! Rows are insert-only; the schema rejects updates and deletes with
//! triggers.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use tidyhome_core::LedgerRepository;
use tidyhome_domain::{LedgerEntry, Result as DomainResult};

use super::blocking::{enum_column, with_connection};
use super::manager::DbManager;

pub struct SqliteLedgerRepository {
    db: Arc<DbManager>,
}

impl SqliteLedgerRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Reportable earnings of a worker for a tax year, in cents.
    pub async fn reportable_total(&self, worker_id: &str, tax_year: i32) -> DomainResult<i64> {
        let worker_id = worker_id.to_string();
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT COALESCE(SUM(amount_cents), 0) FROM ledger_entries
                 WHERE worker_id = ?1 AND tax_year = ?2 AND reportable = 1",
                params![worker_id, tax_year],
                |row| row.get(0),
            )
        })
        .await
    }
}

#[async_trait]
impl LedgerRepository for SqliteLedgerRepository {
    async fn append(&self, entries: &[LedgerEntry]) -> DomainResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let entries = entries.to_vec();
        with_connection(&self.db, move |conn| {
            let tx = conn.transaction()?;
            for entry in &entries {
                insert_entry(&tx, entry)?;
            }
            tx.commit()
        })
        .await
    }

    async fn list_for_job(&self, job_id: &str) -> DomainResult<Vec<LedgerEntry>> {
        let job_id = job_id.to_string();
        with_connection(&self.db, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, job_id, worker_id, payout_id, kind, amount_cents, currency,
                        reportable, tax_year, transfer_id, created_at
                 FROM ledger_entries
                 WHERE job_id = ?1
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt.query_map(params![job_id], map_entry)?;
            rows.collect()
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn insert_entry(conn: &Connection, entry: &LedgerEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO ledger_entries (id, job_id, worker_id, payout_id, kind, amount_cents,
                currency, reportable, tax_year, transfer_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            entry.id,
            entry.job_id,
            entry.worker_id,
            entry.payout_id,
            entry.kind.to_string(),
            entry.amount_cents,
            entry.currency,
            entry.reportable,
            entry.tax_year,
            entry.transfer_id,
            entry.created_at,
        ],
    )?;
    Ok(())
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        job_id: row.get(1)?,
        worker_id: row.get(2)?,
        payout_id: row.get(3)?,
        kind: enum_column(row, 4)?,
        amount_cents: row.get(5)?,
        currency: row.get(6)?,
        reportable: row.get(7)?,
        tax_year: row.get(8)?,
        transfer_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}
