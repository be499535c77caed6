//! Platform fee configuration and business volume types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Platform fee percentages and the large-business qualification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee for jobs performed by independent contractors.
    pub individual_fee_percent: Decimal,
    /// Fee for jobs performed under a business-owner account.
    pub business_fee_percent: Decimal,
    /// Discounted fee for businesses meeting the volume threshold.
    pub large_business_fee_percent: Decimal,
    /// Completed jobs required within the lookback window.
    pub large_business_threshold: u32,
    /// Number of calendar months (including the current one) to sum.
    pub lookback_months: u32,
}

/// Fee configuration used when the configuration store has no row.
pub const DEFAULT_FEE_CONFIG: FeeConfig = FeeConfig {
    individual_fee_percent: dec!(10),
    business_fee_percent: dec!(15),
    large_business_fee_percent: dec!(12),
    large_business_threshold: 50,
    lookback_months: 1,
};

impl Default for FeeConfig {
    fn default() -> Self {
        DEFAULT_FEE_CONFIG
    }
}

/// Which fee schedule produced a fee percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTier {
    Individual,
    Standard,
    LargeBusiness,
}

impl_domain_status_conversions!(FeeTier {
    Individual => "individual",
    Standard => "standard",
    LargeBusiness => "large_business",
});

/// Fee decision for one payout run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessFee {
    pub fee_percent: Decimal,
    pub fee_tier: FeeTier,
    pub qualifies: bool,
    /// Completed jobs still missing to reach the large-business tier.
    pub cleanings_needed: u32,
}

/// Completed-job volume of one business in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeStats {
    pub business_id: String,
    /// Calendar month formatted as `YYYY-MM`.
    pub month: String,
    pub completed_jobs: u32,
    pub revenue_cents: i64,
    pub updated_at: i64,
}
