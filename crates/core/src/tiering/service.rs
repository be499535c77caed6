//! Loyalty tier service - recompute-on-read tier snapshots

use std::sync::Arc;

use chrono::Utc;
use tidyhome_domain::{LoyaltyTierSnapshot, Result};
use tracing::{debug, instrument};

use super::calculator::calculate_tier;
use super::ports::{PreferredSiteRepository, TierSnapshotRepository};
use crate::config_ports::{resolve_tier_config, ConfigStore};

/// Computes and stores a worker's loyalty tier.
///
/// The tier is always current as of the call: every recalculation counts
/// relationships again and reloads the active tier configuration. There is
/// no cache to invalidate when relationships change.
pub struct LoyaltyTierService {
    relationships: Arc<dyn PreferredSiteRepository>,
    snapshots: Arc<dyn TierSnapshotRepository>,
    config: Arc<dyn ConfigStore>,
}

impl LoyaltyTierService {
    pub fn new(
        relationships: Arc<dyn PreferredSiteRepository>,
        snapshots: Arc<dyn TierSnapshotRepository>,
        config: Arc<dyn ConfigStore>,
    ) -> Self {
        Self { relationships, snapshots, config }
    }

    /// Recount relationships, recalculate and persist the worker's tier.
    #[instrument(skip(self))]
    pub async fn recalculate_tier(&self, worker_id: &str) -> Result<LoyaltyTierSnapshot> {
        let count = self.relationships.count_for_worker(worker_id).await?;
        let config = resolve_tier_config(self.config.as_ref()).await?;
        let result = calculate_tier(count, &config);

        let snapshot =
            LoyaltyTierSnapshot::from_result(worker_id, count, &result, Utc::now().timestamp());
        self.snapshots.upsert(&snapshot).await?;

        debug!(
            tier = %snapshot.tier,
            preferred_sites = count,
            bonus_percent = %snapshot.bonus_percent,
            "loyalty tier recalculated"
        );
        Ok(snapshot)
    }

    /// Last stored snapshot without recomputing.
    ///
    /// Workers that were never calculated get the bronze/zero default.
    pub async fn tier_status(&self, worker_id: &str) -> Result<LoyaltyTierSnapshot> {
        Ok(self
            .snapshots
            .get(worker_id)
            .await?
            .unwrap_or_else(|| LoyaltyTierSnapshot::unranked(worker_id)))
    }
}
