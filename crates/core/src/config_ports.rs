//! Configuration store port for tier and fee settings.
//!
//! Operators edit tier boundaries and fee percentages at runtime. The most
//! recently updated row is the active one. When no row exists the named
//! defaults from `tidyhome_domain` apply; an absent configuration is not an
//! error.
//!
//! Callers resolve the configuration once per call chain and pass the value
//! down, so a single payout run never mixes two versions.

use async_trait::async_trait;
use tidyhome_domain::{FeeConfig, Result, TierConfig, DEFAULT_FEE_CONFIG, DEFAULT_TIER_CONFIG};
use tracing::{debug, warn};

/// Port for reading and writing business configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Most recently updated tier configuration, if any.
    async fn active_tier_config(&self) -> Result<Option<TierConfig>>;

    /// Most recently updated fee configuration, if any.
    async fn active_fee_config(&self) -> Result<Option<FeeConfig>>;

    /// Store a new tier configuration; it becomes the active one.
    async fn save_tier_config(&self, config: &TierConfig) -> Result<()>;

    /// Store a new fee configuration; it becomes the active one.
    async fn save_fee_config(&self, config: &FeeConfig) -> Result<()>;
}

/// Active tier configuration, or [`DEFAULT_TIER_CONFIG`] when none is stored.
///
/// A stored configuration with gaps or overlaps is logged and still used.
pub async fn resolve_tier_config(store: &dyn ConfigStore) -> Result<TierConfig> {
    Ok(match store.active_tier_config().await? {
        Some(config) => {
            for problem in config.validate() {
                warn!(%problem, "stored tier configuration is inconsistent");
            }
            config
        }
        None => {
            debug!("no tier configuration stored; using defaults");
            DEFAULT_TIER_CONFIG
        }
    })
}

/// Active fee configuration, or [`DEFAULT_FEE_CONFIG`] when none is stored.
pub async fn resolve_fee_config(store: &dyn ConfigStore) -> Result<FeeConfig> {
    Ok(match store.active_fee_config().await? {
        Some(config) => config,
        None => {
            debug!("no fee configuration stored; using defaults");
            DEFAULT_FEE_CONFIG
        }
    })
}
