//! SQLite-backed configuration store.
//!
//! Tier and fee configurations are stored as JSON documents, one row per
//! save. The row with the latest `updated_at` is the active one; older rows
//! remain as history.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tidyhome_core::ConfigStore;
use tidyhome_domain::{FeeConfig, Result as DomainResult, TidyHomeError, TierConfig};
use tracing::info;

use super::blocking::with_connection;
use super::manager::DbManager;

/// Configuration store over the `tier_configs` and `fee_configs` tables.
pub struct SqliteConfigStore {
    db: Arc<DbManager>,
}

impl SqliteConfigStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn latest<T>(&self, table: ConfigTable) -> DomainResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let raw = with_connection(&self.db, move |conn| query_latest(conn, table)).await?;
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                TidyHomeError::Config(format!("stored {} is malformed: {e}", table.name()))
            })
        })
        .transpose()
    }

    async fn save<T: Serialize>(&self, table: ConfigTable, config: &T) -> DomainResult<()> {
        let json = serde_json::to_string(config)
            .map_err(|e| TidyHomeError::Internal(format!("serialize {}: {e}", table.name())))?;
        let now = chrono::Utc::now().timestamp();
        with_connection(&self.db, move |conn| insert_config(conn, table, &json, now)).await?;
        info!(table = table.name(), "configuration saved");
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn active_tier_config(&self) -> DomainResult<Option<TierConfig>> {
        self.latest(ConfigTable::Tier).await
    }

    async fn active_fee_config(&self) -> DomainResult<Option<FeeConfig>> {
        self.latest(ConfigTable::Fee).await
    }

    async fn save_tier_config(&self, config: &TierConfig) -> DomainResult<()> {
        self.save(ConfigTable::Tier, config).await
    }

    async fn save_fee_config(&self, config: &FeeConfig) -> DomainResult<()> {
        self.save(ConfigTable::Fee, config).await
    }
}

#[derive(Debug, Clone, Copy)]
enum ConfigTable {
    Tier,
    Fee,
}

impl ConfigTable {
    const fn name(self) -> &'static str {
        match self {
            Self::Tier => "tier_configs",
            Self::Fee => "fee_configs",
        }
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn query_latest(conn: &Connection, table: ConfigTable) -> rusqlite::Result<Option<String>> {
    let sql = format!(
        "SELECT config FROM {} ORDER BY updated_at DESC, id DESC LIMIT 1",
        table.name()
    );
    conn.query_row(&sql, [], |row| row.get(0)).optional()
}

fn insert_config(
    conn: &Connection,
    table: ConfigTable,
    json: &str,
    now: i64,
) -> rusqlite::Result<()> {
    let sql = format!("INSERT INTO {} (config, updated_at) VALUES (?1, ?2)", table.name());
    conn.execute(&sql, params![json, now])?;
    Ok(())
}
