//! # TidyHome Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Tier calculation and loyalty tier recomputation
//! - The bonus engine splitting a job's gross between worker and platform
//! - Fee-tier qualification for business accounts
//! - The payout orchestrator driving transfers through the payment gateway
//! - Port/adapter interfaces (traits) for persistence and the gateway
//!
//! ## Architecture Principles
//! - Only depends on `tidyhome-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod bonus;
pub mod fees;
pub mod payouts;
pub mod tiering;

// Infrastructure ports
pub mod config_ports;

pub use bonus::BonusEngine;
pub use config_ports::{resolve_fee_config, resolve_tier_config, ConfigStore};
pub use fees::ports::VolumeStatsRepository;
pub use fees::FeeTierQualifier;
pub use payouts::ports::{
    Charge, JobRepository, LedgerRepository, PayeeAccountRepository, PaymentGateway,
    PayoutRepository, Transfer, TransferRequest,
};
pub use payouts::{JobLocks, OrchestratorSettings, PayoutDependencies, PayoutOrchestrator};
pub use tiering::ports::{PreferredSiteRepository, TierSnapshotRepository};
pub use tiering::{calculate_tier, LoyaltyTierService};
