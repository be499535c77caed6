//! SQLite-backed business volume counters.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tidyhome_core::VolumeStatsRepository;
use tidyhome_domain::{Result as DomainResult, VolumeStats};

use super::blocking::{count_to_u32, with_connection};
use super::manager::DbManager;

pub struct SqliteVolumeStatsRepository {
    db: Arc<DbManager>,
}

impl SqliteVolumeStatsRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VolumeStatsRepository for SqliteVolumeStatsRepository {
    async fn completed_jobs_since(&self, business_id: &str, from_month: &str) -> DomainResult<u32> {
        let (business_id, from_month) = (business_id.to_string(), from_month.to_string());
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT COALESCE(SUM(completed_jobs), 0) FROM volume_stats
                 WHERE business_id = ?1 AND month >= ?2",
                params![business_id, from_month],
                |row| row.get::<_, i64>(0),
            )
            .map(count_to_u32)
        })
        .await
    }

    async fn record_completed_job(
        &self,
        business_id: &str,
        month: &str,
        revenue_cents: i64,
        recorded_at: i64,
    ) -> DomainResult<()> {
        let (business_id, month) = (business_id.to_string(), month.to_string());
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO volume_stats (business_id, month, completed_jobs, revenue_cents, updated_at)
                 VALUES (?1, ?2, 1, ?3, ?4)
                 ON CONFLICT(business_id, month) DO UPDATE SET
                    completed_jobs = completed_jobs + 1,
                    revenue_cents = revenue_cents + excluded.revenue_cents,
                    updated_at = excluded.updated_at",
                params![business_id, month, revenue_cents, recorded_at],
            )
            .map(|_| ())
        })
        .await
    }

    async fn get_month(&self, business_id: &str, month: &str) -> DomainResult<Option<VolumeStats>> {
        let (business_id, month) = (business_id.to_string(), month.to_string());
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT business_id, month, completed_jobs, revenue_cents, updated_at
                 FROM volume_stats WHERE business_id = ?1 AND month = ?2",
                params![business_id, month],
                |row| {
                    Ok(VolumeStats {
                        business_id: row.get(0)?,
                        month: row.get(1)?,
                        completed_jobs: row.get(2)?,
                        revenue_cents: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .await
    }
}
