//! SQLite-backed preferred-site relationships.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use tidyhome_core::PreferredSiteRepository;
use tidyhome_domain::{PreferredSiteRelationship, Result as DomainResult};

use super::blocking::{count_to_u32, enum_column, with_connection};
use super::manager::DbManager;

/// Relationships keyed by (worker, site).
pub struct SqlitePreferredSiteRepository {
    db: Arc<DbManager>,
}

impl SqlitePreferredSiteRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PreferredSiteRepository for SqlitePreferredSiteRepository {
    async fn count_for_worker(&self, worker_id: &str) -> DomainResult<u32> {
        let worker_id = worker_id.to_string();
        with_connection(&self.db, move |conn| count_relationships(conn, &worker_id)).await
    }

    async fn exists(&self, worker_id: &str, site_id: &str) -> DomainResult<bool> {
        let (worker_id, site_id) = (worker_id.to_string(), site_id.to_string());
        with_connection(&self.db, move |conn| relationship_exists(conn, &worker_id, &site_id)).await
    }

    async fn list_for_worker(
        &self,
        worker_id: &str,
    ) -> DomainResult<Vec<PreferredSiteRelationship>> {
        let worker_id = worker_id.to_string();
        with_connection(&self.db, move |conn| query_for_worker(conn, &worker_id)).await
    }

    async fn upsert(&self, relationship: &PreferredSiteRelationship) -> DomainResult<()> {
        let relationship = relationship.clone();
        with_connection(&self.db, move |conn| upsert_relationship(conn, &relationship)).await
    }

    async fn remove(&self, worker_id: &str, site_id: &str) -> DomainResult<bool> {
        let (worker_id, site_id) = (worker_id.to_string(), site_id.to_string());
        with_connection(&self.db, move |conn| {
            conn.execute(
                "DELETE FROM preferred_sites WHERE worker_id = ?1 AND site_id = ?2",
                params![worker_id, site_id],
            )
            .map(|deleted| deleted > 0)
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn count_relationships(conn: &Connection, worker_id: &str) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM preferred_sites WHERE worker_id = ?1",
        params![worker_id],
        |row| row.get::<_, i64>(0),
    )
    .map(count_to_u32)
}

fn relationship_exists(
    conn: &Connection,
    worker_id: &str,
    site_id: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM preferred_sites WHERE worker_id = ?1 AND site_id = ?2)",
        params![worker_id, site_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|found| found != 0)
}

fn query_for_worker(
    conn: &Connection,
    worker_id: &str,
) -> rusqlite::Result<Vec<PreferredSiteRelationship>> {
    let mut stmt = conn.prepare(
        "SELECT worker_id, site_id, level, priority, source, created_at
         FROM preferred_sites
         WHERE worker_id = ?1
         ORDER BY priority, site_id",
    )?;
    let rows = stmt.query_map(params![worker_id], map_relationship)?;
    rows.collect()
}

fn upsert_relationship(
    conn: &Connection,
    relationship: &PreferredSiteRelationship,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO preferred_sites (worker_id, site_id, level, priority, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(worker_id, site_id) DO UPDATE SET
            level = excluded.level,
            priority = excluded.priority,
            source = excluded.source",
        params![
            relationship.worker_id,
            relationship.site_id,
            relationship.level.to_string(),
            relationship.priority,
            relationship.source.to_string(),
            relationship.created_at,
        ],
    )?;
    Ok(())
}

fn map_relationship(row: &Row<'_>) -> rusqlite::Result<PreferredSiteRelationship> {
    Ok(PreferredSiteRelationship {
        worker_id: row.get(0)?,
        site_id: row.get(1)?,
        level: enum_column(row, 2)?,
        priority: row.get(3)?,
        source: enum_column(row, 4)?,
        created_at: row.get(5)?,
    })
}
