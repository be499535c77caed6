//! Application configuration structures
//!
//! Runtime settings for the process (database location, payment gateway
//! endpoint, payout fan-out). Business rules such as tier boundaries and fee
//! percentages are not part of this file; they live in the configuration
//! store and are resolved per payout run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_GATEWAY_MAX_ATTEMPTS,
    DEFAULT_GATEWAY_TIMEOUT_SECS, DEFAULT_GATEWAY_URL, DEFAULT_PAYOUT_CONCURRENCY,
    GATEWAY_MAX_BACKOFF_SECS,
};

/// Top-level configuration for the application
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub payouts: PayoutsConfig,
}

/// SQLite database settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Payment gateway endpoint and request policy
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Timeout of one HTTP attempt.
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_gateway_attempts")]
    pub max_attempts: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
            max_attempts: DEFAULT_GATEWAY_MAX_ATTEMPTS,
        }
    }
}

impl GatewayConfig {
    /// Timeout of one HTTP attempt, never below a second.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Longest wait between attempts.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(GATEWAY_MAX_BACKOFF_SECS)
    }

    /// Deadline for a whole gateway call: every attempt timing out plus the
    /// longest backoff before each retry.
    pub fn call_deadline(&self) -> Duration {
        let attempts = u32::try_from(self.max_attempts.max(1)).unwrap_or(u32::MAX);
        self.attempt_timeout()
            .saturating_mul(attempts)
            .saturating_add(self.max_backoff().saturating_mul(attempts - 1))
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Payout orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutsConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Number of worker pipelines allowed in flight for one job.
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,
}

impl Default for PayoutsConfig {
    fn default() -> Self {
        Self { currency: default_currency(), max_concurrency: DEFAULT_PAYOUT_CONCURRENCY }
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_gateway_timeout() -> u64 {
    DEFAULT_GATEWAY_TIMEOUT_SECS
}

fn default_gateway_attempts() -> usize {
    DEFAULT_GATEWAY_MAX_ATTEMPTS
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_PAYOUT_CONCURRENCY
}
