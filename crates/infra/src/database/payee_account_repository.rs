//! SQLite-backed worker payee accounts.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tidyhome_core::PayeeAccountRepository;
use tidyhome_domain::{PayeeAccount, Result as DomainResult};

use super::blocking::with_connection;
use super::manager::DbManager;

pub struct SqlitePayeeAccountRepository {
    db: Arc<DbManager>,
}

impl SqlitePayeeAccountRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PayeeAccountRepository for SqlitePayeeAccountRepository {
    async fn find(&self, worker_id: &str) -> DomainResult<Option<PayeeAccount>> {
        let worker_id = worker_id.to_string();
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT worker_id, account_ref FROM payee_accounts WHERE worker_id = ?1",
                params![worker_id],
                |row| Ok(PayeeAccount { worker_id: row.get(0)?, account_ref: row.get(1)? }),
            )
            .optional()
        })
        .await
    }

    async fn upsert(&self, account: &PayeeAccount) -> DomainResult<()> {
        let account = account.clone();
        let now = chrono::Utc::now().timestamp();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO payee_accounts (worker_id, account_ref, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(worker_id) DO UPDATE SET
                    account_ref = excluded.account_ref,
                    updated_at = excluded.updated_at",
                params![account.worker_id, account.account_ref, now],
            )
            .map(|_| ())
        })
        .await
    }
}
