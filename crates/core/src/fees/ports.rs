//! Port interface for business volume statistics

use async_trait::async_trait;
use tidyhome_domain::{Result, VolumeStats};

/// Trait for per-business, per-month completed-job counters
#[async_trait]
pub trait VolumeStatsRepository: Send + Sync {
    /// Sum of completed jobs in months `>= from_month` (`YYYY-MM`)
    async fn completed_jobs_since(&self, business_id: &str, from_month: &str) -> Result<u32>;

    /// Add one completed job and its revenue to the month's counters
    async fn record_completed_job(
        &self,
        business_id: &str,
        month: &str,
        revenue_cents: i64,
        recorded_at: i64,
    ) -> Result<()>;

    /// Counters for a single month, if any job was recorded
    async fn get_month(&self, business_id: &str, month: &str) -> Result<Option<VolumeStats>>;
}
