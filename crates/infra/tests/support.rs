//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use tempfile::TempDir;
use tidyhome_domain::{
    Job, PayeeAccount, PreferenceLevel, PreferredSiteRelationship, RelationshipSource,
};
use tidyhome_infra::database::DbManager;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness so it shows up for
/// failing tests only.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("tidyhome=debug"))
            .with_test_writer()
            .try_init();
    });
}

/// Temporary database with migrations applied. The directory lives as long
/// as the harness.
pub struct DbHarness {
    _temp_dir: TempDir,
    pub manager: Arc<DbManager>,
}

impl DbHarness {
    pub fn new() -> Self {
        init_tracing();
        let temp_dir = TempDir::new().expect("temporary directory should be created");
        let db_path = temp_dir.path().join("payouts.db");

        let manager =
            Arc::new(DbManager::new(&db_path, 4).expect("database manager should initialise"));
        manager.run_migrations().expect("schema migrations should apply");

        Self { _temp_dir: temp_dir, manager }
    }

    /// Execute raw SQL against the database.
    pub fn execute(&self, sql: &str) -> rusqlite::Result<usize> {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.execute(sql, [])
    }
}

pub fn relationship(worker_id: &str, site_id: &str) -> PreferredSiteRelationship {
    PreferredSiteRelationship {
        worker_id: worker_id.to_string(),
        site_id: site_id.to_string(),
        level: PreferenceLevel::Favorite,
        priority: 2,
        source: RelationshipSource::Review,
        created_at: 1_700_000_000,
    }
}

pub fn account(worker_id: &str) -> PayeeAccount {
    PayeeAccount { worker_id: worker_id.to_string(), account_ref: format!("acct_{worker_id}") }
}

pub fn job(id: &str, site_id: &str, business_id: Option<&str>, amount_charged_cents: i64) -> Job {
    Job {
        id: id.to_string(),
        site_id: site_id.to_string(),
        business_id: business_id.map(str::to_string),
        amount_charged_cents,
        currency: "usd".to_string(),
        charge_ref: Some(format!("pi_{id}")),
    }
}
