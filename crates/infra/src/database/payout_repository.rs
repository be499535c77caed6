//! SQLite-backed payouts.
//!
//! `UNIQUE(job_id, worker_id)` keeps one row per worker per job. The upsert
//! leaves completed rows untouched, and status changes are conditional
//! updates guarded by the payout state machine, so exactly one run wins the
//! move to `completed` however many processes race for it.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tidyhome_core::PayoutRepository;
use tidyhome_domain::{
    rotates_key, Payout, PayoutStatus, Result as DomainResult, TidyHomeError,
};
use tracing::debug;

use super::blocking::{decimal_column, enum_column, optional_enum_column, with_connection};
use super::manager::DbManager;

const PAYOUT_COLUMNS: &str = "id, job_id, worker_id, amount_cents, platform_fee_cents, currency,
    status, is_preferred_home_job, preferred_bonus_applied, preferred_bonus_percent,
    preferred_bonus_amount_cents, tier_at_payout, payout_priority, expected_payout_hours,
    transfer_id, failure_reason, created_at, updated_at, paid_at, attempt";

pub struct SqlitePayoutRepository {
    db: Arc<DbManager>,
}

impl SqlitePayoutRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PayoutRepository for SqlitePayoutRepository {
    async fn find(&self, job_id: &str, worker_id: &str) -> DomainResult<Option<Payout>> {
        let (job_id, worker_id) = (job_id.to_string(), worker_id.to_string());
        with_connection(&self.db, move |conn| query_payout(conn, &job_id, &worker_id)).await
    }

    async fn upsert_processing(&self, payout: &Payout) -> DomainResult<Payout> {
        let payout = payout.clone();
        let (job_id, worker_id) = (payout.job_id.clone(), payout.worker_id.clone());

        let stored = with_connection(&self.db, move |conn| {
            let tx = conn.transaction()?;
            let changed = upsert_payout(&tx, &payout)?;
            let stored = query_payout(&tx, &payout.job_id, &payout.worker_id)?;
            tx.commit()?;
            Ok((changed, stored))
        })
        .await?;

        match stored {
            (changed, Some(row)) => {
                debug!(payout_id = %row.id, status = %row.status, changed, "payout upserted");
                Ok(row)
            }
            (_, None) => Err(TidyHomeError::Internal(format!(
                "payout for job {job_id} worker {worker_id} missing after upsert"
            ))),
        }
    }

    async fn mark_completed(
        &self,
        payout_id: &str,
        transfer_id: &str,
        paid_at: i64,
    ) -> DomainResult<bool> {
        let (id, transfer_id) = (payout_id.to_string(), transfer_id.to_string());
        let sql = format!(
            "UPDATE payouts
             SET status = 'completed', transfer_id = ?2, failure_reason = NULL,
                 updated_at = ?3, paid_at = ?3
             WHERE id = ?1 AND status IN ({})",
            source_states(PayoutStatus::Completed)
        );
        let outcome = with_connection(&self.db, move |conn| {
            let updated = conn.execute(&sql, params![id, transfer_id, paid_at])?;
            transition_outcome(conn, &id, updated)
        })
        .await?;
        won_or_missing(outcome, payout_id)
    }

    async fn mark_failed(
        &self,
        payout_id: &str,
        error: &TidyHomeError,
        failed_at: i64,
    ) -> DomainResult<bool> {
        let (id, reason) = (payout_id.to_string(), error.to_string());
        let next_attempt = u32::from(rotates_key(error));
        let sql = format!(
            "UPDATE payouts
             SET status = 'failed', failure_reason = ?2, updated_at = ?3, attempt = attempt + ?4
             WHERE id = ?1 AND status IN ({})",
            source_states(PayoutStatus::Failed)
        );
        let outcome = with_connection(&self.db, move |conn| {
            let updated = conn.execute(&sql, params![id, reason, failed_at, next_attempt])?;
            transition_outcome(conn, &id, updated)
        })
        .await?;
        won_or_missing(outcome, payout_id)
    }

    async fn list_for_job(&self, job_id: &str) -> DomainResult<Vec<Payout>> {
        let job_id = job_id.to_string();
        with_connection(&self.db, move |conn| {
            let sql = format!(
                "SELECT {PAYOUT_COLUMNS} FROM payouts WHERE job_id = ?1 ORDER BY created_at, id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![job_id], map_payout)?;
            rows.collect()
        })
        .await
    }
}

/// `'processing', 'failed'` for `completed`; the SQL form of the guard.
fn source_states(next: PayoutStatus) -> String {
    PayoutStatus::sources_of(next).map(|from| format!("'{from}'")).collect::<Vec<_>>().join(", ")
}

fn won_or_missing(outcome: Option<bool>, payout_id: &str) -> DomainResult<bool> {
    outcome.ok_or_else(|| TidyHomeError::NotFound(format!("payout {payout_id}")))
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

/// `Some(true)` when this update moved the row, `Some(false)` when the row
/// exists but was already past the transition, `None` when it is missing.
fn transition_outcome(
    conn: &Connection,
    payout_id: &str,
    updated: usize,
) -> rusqlite::Result<Option<bool>> {
    if updated > 0 {
        return Ok(Some(true));
    }
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM payouts WHERE id = ?1)",
        params![payout_id],
        |row| row.get(0),
    )?;
    Ok(exists.then_some(false))
}

fn query_payout(
    conn: &Connection,
    job_id: &str,
    worker_id: &str,
) -> rusqlite::Result<Option<Payout>> {
    let sql = format!("SELECT {PAYOUT_COLUMNS} FROM payouts WHERE job_id = ?1 AND worker_id = ?2");
    conn.query_row(&sql, params![job_id, worker_id], map_payout).optional()
}

/// Insert or refresh a non-completed row; returns the number of rows written.
///
/// A refreshed row keeps its id and attempt, so a run picking up an
/// interrupted `processing` row re-sends the same idempotency key.
fn upsert_payout(conn: &Connection, payout: &Payout) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO payouts (id, job_id, worker_id, amount_cents, platform_fee_cents, currency,
                status, is_preferred_home_job, preferred_bonus_applied, preferred_bonus_percent,
                preferred_bonus_amount_cents, tier_at_payout, payout_priority,
                expected_payout_hours, transfer_id, failure_reason, created_at, updated_at, paid_at,
                attempt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, NULL, NULL, ?15, ?16,
                 NULL, ?17)
         ON CONFLICT(job_id, worker_id) DO UPDATE SET
            amount_cents = excluded.amount_cents,
            platform_fee_cents = excluded.platform_fee_cents,
            currency = excluded.currency,
            status = excluded.status,
            is_preferred_home_job = excluded.is_preferred_home_job,
            preferred_bonus_applied = excluded.preferred_bonus_applied,
            preferred_bonus_percent = excluded.preferred_bonus_percent,
            preferred_bonus_amount_cents = excluded.preferred_bonus_amount_cents,
            tier_at_payout = excluded.tier_at_payout,
            payout_priority = excluded.payout_priority,
            expected_payout_hours = excluded.expected_payout_hours,
            transfer_id = NULL,
            failure_reason = NULL,
            updated_at = excluded.updated_at,
            paid_at = NULL
         WHERE payouts.status != 'completed'",
        params![
            payout.id,
            payout.job_id,
            payout.worker_id,
            payout.amount_cents,
            payout.platform_fee_cents,
            payout.currency,
            payout.status.to_string(),
            payout.is_preferred_home_job,
            payout.preferred_bonus_applied,
            payout.preferred_bonus_percent.to_string(),
            payout.preferred_bonus_amount_cents,
            payout.tier_at_payout.map(|tier| tier.to_string()),
            payout.payout_priority.to_string(),
            payout.expected_payout_hours,
            payout.created_at,
            payout.updated_at,
            payout.attempt,
        ],
    )
}

fn map_payout(row: &Row<'_>) -> rusqlite::Result<Payout> {
    Ok(Payout {
        id: row.get(0)?,
        job_id: row.get(1)?,
        worker_id: row.get(2)?,
        amount_cents: row.get(3)?,
        platform_fee_cents: row.get(4)?,
        currency: row.get(5)?,
        status: enum_column(row, 6)?,
        is_preferred_home_job: row.get(7)?,
        preferred_bonus_applied: row.get(8)?,
        preferred_bonus_percent: decimal_column(row, 9)?,
        preferred_bonus_amount_cents: row.get(10)?,
        tier_at_payout: optional_enum_column(row, 11)?,
        payout_priority: enum_column(row, 12)?,
        expected_payout_hours: row.get(13)?,
        transfer_id: row.get(14)?,
        failure_reason: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
        paid_at: row.get(18)?,
        attempt: row.get(19)?,
    })
}
