//! Loyalty tier types
//!
//! A worker's tier is derived from how many clients have marked them as
//! preferred for their home. Higher tiers return a larger share of the
//! platform fee on preferred-home jobs and may unlock faster payouts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAYOUT_HOURS;
use crate::impl_domain_status_conversions;

/// Loyalty tier, ordered from lowest to highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl_domain_status_conversions!(Tier {
    Bronze => "bronze",
    Silver => "silver",
    Gold => "gold",
    Platinum => "platinum",
});

/// Inclusive range of preferred-site counts mapped to one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    pub min: u32,
    /// `None` means unbounded (only meaningful for platinum).
    pub max: Option<u32>,
    /// Percentage of the platform fee returned to the worker.
    pub bonus_percent: Decimal,
}

impl TierBand {
    pub const fn new(min: u32, max: Option<u32>, bonus_percent: Decimal) -> Self {
        Self { min, max, bonus_percent }
    }

    /// Whether `count` falls inside `[min, max]`.
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

/// Tier boundaries, bonus percentages and payout perks.
///
/// Bands are expected to be contiguous and non-overlapping, but nothing here
/// enforces it. See [`TierConfig::validate`] for an operator-facing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub bronze: TierBand,
    pub silver: TierBand,
    pub gold: TierBand,
    pub platinum: TierBand,
    pub gold_faster_payouts: bool,
    pub gold_payout_hours: u32,
    pub platinum_faster_payouts: bool,
    pub platinum_payout_hours: u32,
    pub platinum_early_access: bool,
}

/// Tier configuration used when the configuration store has no row.
pub const DEFAULT_TIER_CONFIG: TierConfig = TierConfig {
    bronze: TierBand::new(0, Some(2), dec!(0)),
    silver: TierBand::new(3, Some(5), dec!(3)),
    gold: TierBand::new(6, Some(9), dec!(5)),
    platinum: TierBand::new(10, None, dec!(7)),
    gold_faster_payouts: true,
    gold_payout_hours: 24,
    platinum_faster_payouts: true,
    platinum_payout_hours: 12,
    platinum_early_access: true,
};

impl Default for TierConfig {
    fn default() -> Self {
        DEFAULT_TIER_CONFIG
    }
}

impl TierConfig {
    /// Describe gaps, overlaps and out-of-range percentages.
    ///
    /// An empty list means the configuration is well formed. Problems are
    /// reported, never corrected: the calculator still resolves any count.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let bands = [
            (Tier::Bronze, &self.bronze),
            (Tier::Silver, &self.silver),
            (Tier::Gold, &self.gold),
            (Tier::Platinum, &self.platinum),
        ];

        if self.bronze.min != 0 {
            problems.push(format!("bronze must start at 0, starts at {}", self.bronze.min));
        }

        for (tier, band) in &bands {
            if let Some(max) = band.max {
                if max < band.min {
                    problems.push(format!("{tier} max {max} is below its min {}", band.min));
                }
            }
            if band.bonus_percent < Decimal::ZERO || band.bonus_percent > Decimal::ONE_HUNDRED {
                problems.push(format!(
                    "{tier} bonus percent {} is outside 0..=100",
                    band.bonus_percent
                ));
            }
        }

        for pair in bands.windows(2) {
            let (lower_tier, lower) = pair[0];
            let (upper_tier, upper) = pair[1];
            match lower.max {
                Some(max) if upper.min != max.saturating_add(1) => problems.push(format!(
                    "{upper_tier} starts at {} but {lower_tier} ends at {max}",
                    upper.min
                )),
                None => problems.push(format!("{lower_tier} has no max but is not the top tier")),
                _ => {}
            }
        }

        if self.platinum.max.is_some() {
            problems.push("platinum must not have a max".to_string());
        }

        problems
    }
}

/// Output of the tier calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierResult {
    pub tier: Tier,
    pub bonus_percent: Decimal,
    pub faster_payouts: bool,
    pub payout_hours: u32,
    pub early_access: bool,
}

/// Last-computed tier for a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTierSnapshot {
    pub worker_id: String,
    pub tier: Tier,
    pub preferred_site_count: u32,
    pub bonus_percent: Decimal,
    pub faster_payouts: bool,
    pub payout_hours: u32,
    pub early_access: bool,
    /// Unix epoch seconds; `None` until the first recomputation.
    pub last_calculated_at: Option<i64>,
}

impl LoyaltyTierSnapshot {
    /// Snapshot for a worker whose tier has never been calculated.
    pub fn unranked(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            tier: Tier::Bronze,
            preferred_site_count: 0,
            bonus_percent: Decimal::ZERO,
            faster_payouts: false,
            payout_hours: DEFAULT_PAYOUT_HOURS,
            early_access: false,
            last_calculated_at: None,
        }
    }

    pub fn from_result(
        worker_id: impl Into<String>,
        preferred_site_count: u32,
        result: &TierResult,
        calculated_at: i64,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            tier: result.tier,
            preferred_site_count,
            bonus_percent: result.bonus_percent,
            faster_payouts: result.faster_payouts,
            payout_hours: result.payout_hours,
            early_access: result.early_access,
            last_calculated_at: Some(calculated_at),
        }
    }
}
