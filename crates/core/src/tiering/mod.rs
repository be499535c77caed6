//! Loyalty tiers derived from preferred-site relationships

pub mod calculator;
pub mod ports;
pub mod service;

pub use calculator::calculate_tier;
pub use ports::{PreferredSiteRepository, TierSnapshotRepository};
pub use service::LoyaltyTierService;
