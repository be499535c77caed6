//! Per-job lock registry
//!
//! Two payout runs for the same job inside one process are serialized: the
//! second waits for the first and then sees its `completed` rows. Locks for
//! different jobs never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of async mutexes keyed by job id.
#[derive(Debug, Default, Clone)]
pub struct JobLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `job_id`.
    pub async fn acquire(&self, job_id: &str) -> JobLockGuard {
        let lock = self
            .locks
            .entry(job_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.clone().lock_owned().await;
        JobLockGuard { job_id: job_id.to_string(), lock, guard: Some(guard), locks: self.clone() }
    }

    /// Number of jobs with a live lock entry.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Held for the duration of a payout run.
///
/// Dropping the last guard for a job removes its registry entry.
#[derive(Debug)]
pub struct JobLockGuard {
    job_id: String,
    lock: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
    locks: JobLocks,
}

impl Drop for JobLockGuard {
    fn drop(&mut self) {
        // release before checking for waiters
        self.guard.take();
        // registry entry + this guard's handle
        self.locks.locks.remove_if(&self.job_id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}
