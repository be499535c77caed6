//! SQLite-backed loyalty tier snapshots.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tidyhome_core::TierSnapshotRepository;
use tidyhome_domain::{LoyaltyTierSnapshot, Result as DomainResult};

use super::blocking::{decimal_column, enum_column, with_connection};
use super::manager::DbManager;

/// One row per worker; recalculation overwrites it.
pub struct SqliteTierSnapshotRepository {
    db: Arc<DbManager>,
}

impl SqliteTierSnapshotRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TierSnapshotRepository for SqliteTierSnapshotRepository {
    async fn get(&self, worker_id: &str) -> DomainResult<Option<LoyaltyTierSnapshot>> {
        let worker_id = worker_id.to_string();
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT worker_id, tier, preferred_site_count, bonus_percent, faster_payouts,
                        payout_hours, early_access, last_calculated_at
                 FROM tier_snapshots WHERE worker_id = ?1",
                params![worker_id],
                |row| {
                    Ok(LoyaltyTierSnapshot {
                        worker_id: row.get(0)?,
                        tier: enum_column(row, 1)?,
                        preferred_site_count: row.get(2)?,
                        bonus_percent: decimal_column(row, 3)?,
                        faster_payouts: row.get(4)?,
                        payout_hours: row.get(5)?,
                        early_access: row.get(6)?,
                        last_calculated_at: row.get(7)?,
                    })
                },
            )
            .optional()
        })
        .await
    }

    async fn upsert(&self, snapshot: &LoyaltyTierSnapshot) -> DomainResult<()> {
        let snapshot = snapshot.clone();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO tier_snapshots (worker_id, tier, preferred_site_count, bonus_percent,
                        faster_payouts, payout_hours, early_access, last_calculated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(worker_id) DO UPDATE SET
                    tier = excluded.tier,
                    preferred_site_count = excluded.preferred_site_count,
                    bonus_percent = excluded.bonus_percent,
                    faster_payouts = excluded.faster_payouts,
                    payout_hours = excluded.payout_hours,
                    early_access = excluded.early_access,
                    last_calculated_at = excluded.last_calculated_at",
                params![
                    snapshot.worker_id,
                    snapshot.tier.to_string(),
                    snapshot.preferred_site_count,
                    snapshot.bonus_percent.to_string(),
                    snapshot.faster_payouts,
                    snapshot.payout_hours,
                    snapshot.early_access,
                    snapshot.last_calculated_at,
                ],
            )
            .map(|_| ())
        })
        .await
    }
}
