//! Bonus engine
//!
//! Splits a worker's gross share of a job into the platform fee and the
//! worker's net amount. On jobs at a home where the worker holds preferred
//! status, part of the platform fee is returned to the worker according to
//! their loyalty tier. The customer's charge never changes; only the split
//! between platform and worker moves.
//!
//! Amounts are integer cents. The fee is rounded first, then the bonus is
//! taken as a percentage of that rounded fee and rounded again.

use std::sync::Arc;

use rust_decimal::Decimal;
use tidyhome_domain::money::{percent_of, Cents};
use tidyhome_domain::{BonusResult, Result, TidyHomeError, Tier, TierResult};
use tracing::debug;

use crate::tiering::{LoyaltyTierService, PreferredSiteRepository};

/// Fee split when no part of the fee is returned.
pub fn split_without_bonus(
    gross_cents: Cents,
    fee_percent: Decimal,
    is_preferred_job: bool,
    tier: Option<Tier>,
) -> BonusResult {
    let platform_fee = percent_of(gross_cents, fee_percent);
    BonusResult::without_bonus(gross_cents, platform_fee, is_preferred_job, tier)
}

/// Fee split for a preferred-home job at the given tier.
///
/// A tier with a bonus of zero or less yields the plain split, flagged as a
/// preferred job.
pub fn split_with_tier(gross_cents: Cents, fee_percent: Decimal, tier: &TierResult) -> BonusResult {
    if tier.bonus_percent <= Decimal::ZERO {
        return split_without_bonus(gross_cents, fee_percent, true, Some(tier.tier));
    }

    let original_fee = percent_of(gross_cents, fee_percent);
    let bonus_amount = percent_of(original_fee, tier.bonus_percent);
    let adjusted_fee = original_fee - bonus_amount;

    BonusResult {
        is_preferred_job: true,
        bonus_applied: true,
        bonus_percent: tier.bonus_percent,
        bonus_amount_cents: bonus_amount,
        original_platform_fee_cents: original_fee,
        adjusted_platform_fee_cents: adjusted_fee,
        adjusted_net_amount_cents: gross_cents - adjusted_fee,
        tier: Some(tier.tier),
        faster_payouts: tier.faster_payouts,
        payout_hours: Some(tier.payout_hours),
    }
}

/// Computes the per-worker fee split, recalculating the worker's tier on
/// every preferred-home job.
pub struct BonusEngine {
    relationships: Arc<dyn PreferredSiteRepository>,
    tiers: Arc<LoyaltyTierService>,
}

impl BonusEngine {
    pub fn new(
        relationships: Arc<dyn PreferredSiteRepository>,
        tiers: Arc<LoyaltyTierService>,
    ) -> Self {
        Self { relationships, tiers }
    }

    /// Split `gross_cents` for `worker_id` on a job at `site_id`.
    ///
    /// # Errors
    /// `InvalidInput` for a negative gross or a fee outside `0..=100`;
    /// persistence errors from the relationship or snapshot stores.
    pub async fn calculate_payout_bonus(
        &self,
        worker_id: &str,
        site_id: &str,
        gross_cents: Cents,
        base_fee_percent: Decimal,
    ) -> Result<BonusResult> {
        if gross_cents < 0 {
            return Err(TidyHomeError::InvalidInput(format!(
                "gross amount must not be negative, got {gross_cents}"
            )));
        }
        if base_fee_percent < Decimal::ZERO || base_fee_percent > Decimal::ONE_HUNDRED {
            return Err(TidyHomeError::InvalidInput(format!(
                "platform fee percent {base_fee_percent} is outside 0..=100"
            )));
        }

        if !self.relationships.exists(worker_id, site_id).await? {
            return Ok(split_without_bonus(gross_cents, base_fee_percent, false, None));
        }

        let snapshot = self.tiers.recalculate_tier(worker_id).await?;
        let tier = TierResult {
            tier: snapshot.tier,
            bonus_percent: snapshot.bonus_percent,
            faster_payouts: snapshot.faster_payouts,
            payout_hours: snapshot.payout_hours,
            early_access: snapshot.early_access,
        };
        let result = split_with_tier(gross_cents, base_fee_percent, &tier);

        debug!(
            worker_id,
            site_id,
            tier = %tier.tier,
            bonus_applied = result.bonus_applied,
            bonus_cents = result.bonus_amount_cents,
            "preferred-home bonus evaluated"
        );
        Ok(result)
    }
}
