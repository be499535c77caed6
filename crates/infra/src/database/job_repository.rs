//! SQLite-backed completed jobs and their worker assignments.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tidyhome_core::JobRepository;
use tidyhome_domain::{Job, Result as DomainResult};

use super::blocking::with_connection;
use super::manager::DbManager;

pub struct SqliteJobRepository {
    db: Arc<DbManager>,
}

impl SqliteJobRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store a job and replace its worker assignments.
    pub async fn save_job(&self, job: &Job, worker_ids: &[String]) -> DomainResult<()> {
        let job = job.clone();
        let worker_ids = worker_ids.to_vec();
        with_connection(&self.db, move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO jobs (id, site_id, business_id, amount_charged_cents, currency, charge_ref)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    site_id = excluded.site_id,
                    business_id = excluded.business_id,
                    amount_charged_cents = excluded.amount_charged_cents,
                    currency = excluded.currency,
                    charge_ref = excluded.charge_ref",
                params![
                    job.id,
                    job.site_id,
                    job.business_id,
                    job.amount_charged_cents,
                    job.currency,
                    job.charge_ref,
                ],
            )?;
            tx.execute("DELETE FROM job_assignments WHERE job_id = ?1", params![job.id])?;
            for (position, worker_id) in worker_ids.iter().enumerate() {
                tx.execute(
                    "INSERT INTO job_assignments (job_id, worker_id, position) VALUES (?1, ?2, ?3)",
                    params![job.id, worker_id, position],
                )?;
            }
            tx.commit()
        })
        .await
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn find_job(&self, job_id: &str) -> DomainResult<Option<Job>> {
        let job_id = job_id.to_string();
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT id, site_id, business_id, amount_charged_cents, currency, charge_ref
                 FROM jobs WHERE id = ?1",
                params![job_id],
                |row| {
                    Ok(Job {
                        id: row.get(0)?,
                        site_id: row.get(1)?,
                        business_id: row.get(2)?,
                        amount_charged_cents: row.get(3)?,
                        currency: row.get(4)?,
                        charge_ref: row.get(5)?,
                    })
                },
            )
            .optional()
        })
        .await
    }

    async fn assigned_workers(&self, job_id: &str) -> DomainResult<Vec<String>> {
        let job_id = job_id.to_string();
        with_connection(&self.db, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT worker_id FROM job_assignments WHERE job_id = ?1 ORDER BY position",
            )?;
            let rows = stmt.query_map(params![job_id], |row| row.get(0))?;
            rows.collect()
        })
        .await
    }
}
