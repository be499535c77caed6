//! Loyalty tier commands

use std::time::Instant;

use tidyhome_domain::{LoyaltyTierSnapshot, Result as DomainResult};
use tracing::info;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Recount a worker's preferred sites and store the resulting tier.
///
/// Call after a preferred-site relationship is added or removed.
pub async fn recalculate_worker_tier(
    ctx: &AppContext,
    worker_id: &str,
) -> DomainResult<LoyaltyTierSnapshot> {
    let command_name = "tiers::recalculate_worker_tier";
    let start = Instant::now();
    info!(command = command_name, worker_id, "Executing recalculate_worker_tier");

    let result = ctx.tiers.recalculate_tier(worker_id).await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}

/// Last stored tier of a worker, without recomputing.
pub async fn worker_tier_status(
    ctx: &AppContext,
    worker_id: &str,
) -> DomainResult<LoyaltyTierSnapshot> {
    let command_name = "tiers::worker_tier_status";
    let start = Instant::now();

    let result = ctx.tiers.tier_status(worker_id).await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
