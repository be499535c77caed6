//! Port interfaces for loyalty tier data
//!
//! These traits define the boundaries between the tier logic and the
//! persistence of preferred-site relationships and tier snapshots.

use async_trait::async_trait;
use tidyhome_domain::{LoyaltyTierSnapshot, PreferredSiteRelationship, Result};

/// Trait for preferred-site relationship persistence
#[async_trait]
pub trait PreferredSiteRepository: Send + Sync {
    /// Number of sites where the worker currently holds preferred status
    async fn count_for_worker(&self, worker_id: &str) -> Result<u32>;

    /// Whether the worker is preferred at the given site
    async fn exists(&self, worker_id: &str, site_id: &str) -> Result<bool>;

    /// All relationships of a worker ordered by priority
    async fn list_for_worker(&self, worker_id: &str) -> Result<Vec<PreferredSiteRelationship>>;

    /// Create or update a relationship
    async fn upsert(&self, relationship: &PreferredSiteRelationship) -> Result<()>;

    /// Remove a worker from a site's preferred list; returns whether a row existed
    async fn remove(&self, worker_id: &str, site_id: &str) -> Result<bool>;
}

/// Trait for the per-worker tier snapshot
#[async_trait]
pub trait TierSnapshotRepository: Send + Sync {
    /// Stored snapshot, if the tier was ever calculated
    async fn get(&self, worker_id: &str) -> Result<Option<LoyaltyTierSnapshot>>;

    /// Insert or replace the worker's snapshot (last write wins)
    async fn upsert(&self, snapshot: &LoyaltyTierSnapshot) -> Result<()>;
}
