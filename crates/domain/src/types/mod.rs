//! Domain types and models

pub mod fee;
pub mod job;
pub mod ledger;
pub mod payout;
pub mod tier;

pub use fee::{BusinessFee, FeeConfig, FeeTier, VolumeStats, DEFAULT_FEE_CONFIG};
pub use job::{Job, PayeeAccount, PreferenceLevel, PreferredSiteRelationship, RelationshipSource};
pub use ledger::{LedgerEntry, LedgerEntryKind};
pub use payout::{
    rotates_key, BonusResult, OrchestrationResult, Payout, PayoutPriority, PayoutStatus,
    WorkerPayoutResult,
};
pub use tier::{
    LoyaltyTierSnapshot, Tier, TierBand, TierConfig, TierResult, DEFAULT_TIER_CONFIG,
};
