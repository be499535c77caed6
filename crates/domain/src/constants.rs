//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

/// Payout SLA applied whenever a tier grants no faster payouts.
pub const DEFAULT_PAYOUT_HOURS: u32 = 48;

/// ISO currency code used when neither the job nor the config names one.
pub const DEFAULT_CURRENCY: &str = "usd";

// Payment gateway
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GATEWAY_MAX_ATTEMPTS: usize = 3;
/// Longest wait between two attempts of one gateway call.
pub const GATEWAY_MAX_BACKOFF_SECS: u64 = 10;
pub const DEFAULT_GATEWAY_URL: &str = "https://api.stripe.com";

// Database
pub const DEFAULT_DB_PATH: &str = "tidyhome.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

/// Per-worker pipelines run one at a time unless configured otherwise.
pub const DEFAULT_PAYOUT_CONCURRENCY: usize = 1;

/// Prefix for the idempotency key sent with every transfer.
pub const TRANSFER_IDEMPOTENCY_PREFIX: &str = "payout";
