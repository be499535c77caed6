//! In-memory implementations of the core persistence ports
//!
//! State lives behind `std::sync::Mutex`; no lock is held across an await.
//! `InMemoryPayouts` mirrors the storage rules of the SQLite adapter: one
//! row per (job, worker), completed rows are never overwritten and status
//! changes only happen when the state machine allows them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tidyhome_core::{
    ConfigStore, JobRepository, LedgerRepository, PayeeAccountRepository, PayoutRepository,
    PreferredSiteRepository, TierSnapshotRepository, VolumeStatsRepository,
};
use tidyhome_domain::{
    FeeConfig, Job, LedgerEntry, LoyaltyTierSnapshot, PayeeAccount, Payout, PayoutStatus,
    PreferredSiteRelationship, Result as DomainResult, TidyHomeError, TierConfig, VolumeStats,
};

/// Configuration store holding at most one active row of each kind.
#[derive(Default)]
pub struct InMemoryConfigStore {
    tier: Mutex<Option<TierConfig>>,
    fee: Mutex<Option<FeeConfig>>,
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn active_tier_config(&self) -> DomainResult<Option<TierConfig>> {
        Ok(self.tier.lock().unwrap().clone())
    }

    async fn active_fee_config(&self) -> DomainResult<Option<FeeConfig>> {
        Ok(self.fee.lock().unwrap().clone())
    }

    async fn save_tier_config(&self, config: &TierConfig) -> DomainResult<()> {
        *self.tier.lock().unwrap() = Some(config.clone());
        Ok(())
    }

    async fn save_fee_config(&self, config: &FeeConfig) -> DomainResult<()> {
        *self.fee.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPreferredSites {
    rows: Mutex<Vec<PreferredSiteRelationship>>,
}

impl InMemoryPreferredSites {
    pub fn insert(&self, relationship: PreferredSiteRelationship) {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| {
            !(r.worker_id == relationship.worker_id && r.site_id == relationship.site_id)
        });
        rows.push(relationship);
    }
}

#[async_trait]
impl PreferredSiteRepository for InMemoryPreferredSites {
    async fn count_for_worker(&self, worker_id: &str) -> DomainResult<u32> {
        let count = self.rows.lock().unwrap().iter().filter(|r| r.worker_id == worker_id).count();
        Ok(u32::try_from(count).unwrap())
    }

    async fn exists(&self, worker_id: &str, site_id: &str) -> DomainResult<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.worker_id == worker_id && r.site_id == site_id))
    }

    async fn list_for_worker(
        &self,
        worker_id: &str,
    ) -> DomainResult<Vec<PreferredSiteRelationship>> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.worker_id == worker_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.priority);
        Ok(rows)
    }

    async fn upsert(&self, relationship: &PreferredSiteRelationship) -> DomainResult<()> {
        self.insert(relationship.clone());
        Ok(())
    }

    async fn remove(&self, worker_id: &str, site_id: &str) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.worker_id == worker_id && r.site_id == site_id));
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryTierSnapshots {
    rows: Mutex<HashMap<String, LoyaltyTierSnapshot>>,
}

#[async_trait]
impl TierSnapshotRepository for InMemoryTierSnapshots {
    async fn get(&self, worker_id: &str) -> DomainResult<Option<LoyaltyTierSnapshot>> {
        Ok(self.rows.lock().unwrap().get(worker_id).cloned())
    }

    async fn upsert(&self, snapshot: &LoyaltyTierSnapshot) -> DomainResult<()> {
        self.rows.lock().unwrap().insert(snapshot.worker_id.clone(), snapshot.clone());
        Ok(())
    }
}

/// Payout rows keyed by (job, worker).
#[derive(Default)]
pub struct InMemoryPayouts {
    rows: Mutex<HashMap<(String, String), Payout>>,
    fail_completion: AtomicBool,
}

impl InMemoryPayouts {
    /// Make `mark_completed` fail with a database error.
    pub fn fail_completion(&self) {
        self.fail_completion.store(true, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<Payout> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    pub fn get(&self, job_id: &str, worker_id: &str) -> Option<Payout> {
        self.rows.lock().unwrap().get(&(job_id.to_string(), worker_id.to_string())).cloned()
    }

    fn update(
        &self,
        payout_id: &str,
        apply: impl FnOnce(&mut Payout) -> bool,
    ) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let payout = rows
            .values_mut()
            .find(|p| p.id == payout_id)
            .ok_or_else(|| TidyHomeError::NotFound(format!("payout {payout_id}")))?;
        Ok(apply(payout))
    }
}

#[async_trait]
impl PayoutRepository for InMemoryPayouts {
    async fn find(&self, job_id: &str, worker_id: &str) -> DomainResult<Option<Payout>> {
        Ok(self.get(job_id, worker_id))
    }

    async fn upsert_processing(&self, payout: &Payout) -> DomainResult<Payout> {
        let mut rows = self.rows.lock().unwrap();
        let key = (payout.job_id.clone(), payout.worker_id.clone());
        let stored = match rows.get(&key) {
            Some(existing) if existing.status == PayoutStatus::Completed => existing.clone(),
            Some(existing) => Payout {
                id: existing.id.clone(),
                created_at: existing.created_at,
                attempt: existing.attempt,
                ..payout.clone()
            },
            None => payout.clone(),
        };
        rows.insert(key, stored.clone());
        Ok(stored)
    }

    async fn mark_completed(
        &self,
        payout_id: &str,
        transfer_id: &str,
        paid_at: i64,
    ) -> DomainResult<bool> {
        if self.fail_completion.load(Ordering::SeqCst) {
            return Err(TidyHomeError::Database("disk I/O error".to_string()));
        }
        self.update(payout_id, |p| p.mark_completed(transfer_id, paid_at))
    }

    async fn mark_failed(
        &self,
        payout_id: &str,
        error: &TidyHomeError,
        failed_at: i64,
    ) -> DomainResult<bool> {
        self.update(payout_id, |p| p.mark_failed(error, failed_at))
    }

    async fn list_for_job(&self, job_id: &str) -> DomainResult<Vec<Payout>> {
        Ok(self.all().into_iter().filter(|p| p.job_id == job_id).collect())
    }
}

#[derive(Default)]
pub struct InMemoryPayeeAccounts {
    rows: Mutex<HashMap<String, PayeeAccount>>,
}

impl InMemoryPayeeAccounts {
    pub fn insert(&self, account: PayeeAccount) {
        self.rows.lock().unwrap().insert(account.worker_id.clone(), account);
    }
}

#[async_trait]
impl PayeeAccountRepository for InMemoryPayeeAccounts {
    async fn find(&self, worker_id: &str) -> DomainResult<Option<PayeeAccount>> {
        Ok(self.rows.lock().unwrap().get(worker_id).cloned())
    }

    async fn upsert(&self, account: &PayeeAccount) -> DomainResult<()> {
        self.insert(account.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedger {
    async fn append(&self, entries: &[LedgerEntry]) -> DomainResult<()> {
        self.entries.lock().unwrap().extend_from_slice(entries);
        Ok(())
    }

    async fn list_for_job(&self, job_id: &str) -> DomainResult<Vec<LedgerEntry>> {
        Ok(self.entries().into_iter().filter(|e| e.job_id == job_id).collect())
    }
}

#[derive(Default)]
pub struct InMemoryVolumeStats {
    rows: Mutex<HashMap<(String, String), VolumeStats>>,
}

impl InMemoryVolumeStats {
    /// Seed a month's completed-job count.
    pub fn seed(&self, business_id: &str, month: &str, completed_jobs: u32) {
        self.rows.lock().unwrap().insert(
            (business_id.to_string(), month.to_string()),
            VolumeStats {
                business_id: business_id.to_string(),
                month: month.to_string(),
                completed_jobs,
                revenue_cents: 0,
                updated_at: 0,
            },
        );
    }
}

#[async_trait]
impl VolumeStatsRepository for InMemoryVolumeStats {
    async fn completed_jobs_since(&self, business_id: &str, from_month: &str) -> DomainResult<u32> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.business_id == business_id && s.month.as_str() >= from_month)
            .map(|s| s.completed_jobs)
            .sum())
    }

    async fn record_completed_job(
        &self,
        business_id: &str,
        month: &str,
        revenue_cents: i64,
        recorded_at: i64,
    ) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let stats = rows
            .entry((business_id.to_string(), month.to_string()))
            .or_insert_with(|| VolumeStats {
                business_id: business_id.to_string(),
                month: month.to_string(),
                completed_jobs: 0,
                revenue_cents: 0,
                updated_at: recorded_at,
            });
        stats.completed_jobs += 1;
        stats.revenue_cents += revenue_cents;
        stats.updated_at = recorded_at;
        Ok(())
    }

    async fn get_month(&self, business_id: &str, month: &str) -> DomainResult<Option<VolumeStats>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(business_id.to_string(), month.to_string()))
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryJobs {
    rows: Mutex<HashMap<String, (Job, Vec<String>)>>,
}

impl InMemoryJobs {
    pub fn insert(&self, job: Job, workers: Vec<String>) {
        self.rows.lock().unwrap().insert(job.id.clone(), (job, workers));
    }
}

#[async_trait]
impl JobRepository for InMemoryJobs {
    async fn find_job(&self, job_id: &str) -> DomainResult<Option<Job>> {
        Ok(self.rows.lock().unwrap().get(job_id).map(|(job, _)| job.clone()))
    }

    async fn assigned_workers(&self, job_id: &str) -> DomainResult<Vec<String>> {
        Ok(self.rows.lock().unwrap().get(job_id).map(|(_, w)| w.clone()).unwrap_or_default())
    }
}
