//! Port interfaces for payouts
//!
//! The orchestrator reaches the payment processor and every table it writes
//! through these traits. Infra provides SQLite and HTTP adapters; tests use
//! in-memory fakes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidyhome_domain::{Job, LedgerEntry, PayeeAccount, Payout, Result, TidyHomeError};

/// Customer charge a transfer is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub charge_id: String,
}

/// Funds movement from the platform balance to a worker's payee account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub amount_cents: i64,
    pub currency: String,
    /// Payee account reference at the gateway.
    pub destination: String,
    pub linked_charge_id: String,
    /// Stable per (job, worker, attempt): runs racing on the same row send the
    /// same key, while a retry after a decline sends a fresh one.
    pub idempotency_key: String,
    pub metadata: BTreeMap<String, String>,
}

/// Accepted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub transfer_id: String,
}

/// Trait for the external payment processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Look up the customer charge behind a job
    async fn retrieve_charge(&self, charge_ref: &str) -> Result<Charge>;

    /// Move funds to a payee account
    async fn transfer(&self, request: &TransferRequest) -> Result<Transfer>;
}

/// Trait for payout row persistence
#[async_trait]
pub trait PayoutRepository: Send + Sync {
    /// Payout for a (job, worker) pair, if one was ever written
    async fn find(&self, job_id: &str, worker_id: &str) -> Result<Option<Payout>>;

    /// Insert the payout, or overwrite the existing non-completed row for the
    /// same (job, worker) pair. Returns the stored row, which keeps the id and
    /// `created_at` of an existing row.
    async fn upsert_processing(&self, payout: &Payout) -> Result<Payout>;

    /// Transition a payout to `completed` if the state machine allows it.
    /// Returns whether this call made the transition; `false` means another
    /// run already completed the row. `NotFound` when the row is missing.
    async fn mark_completed(
        &self,
        payout_id: &str,
        transfer_id: &str,
        paid_at: i64,
    ) -> Result<bool>;

    /// Transition a `processing` payout to `failed`, recording the error. A
    /// definitive decline also moves the row to its next transfer attempt.
    async fn mark_failed(
        &self,
        payout_id: &str,
        error: &TidyHomeError,
        failed_at: i64,
    ) -> Result<bool>;

    /// All payouts of a job
    async fn list_for_job(&self, job_id: &str) -> Result<Vec<Payout>>;
}

/// Trait for worker payee accounts
#[async_trait]
pub trait PayeeAccountRepository: Send + Sync {
    /// Linked account, if the worker finished onboarding
    async fn find(&self, worker_id: &str) -> Result<Option<PayeeAccount>>;

    /// Link or replace the worker's payee account
    async fn upsert(&self, account: &PayeeAccount) -> Result<()>;
}

/// Trait for the append-only transaction ledger
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Append entries atomically
    async fn append(&self, entries: &[LedgerEntry]) -> Result<()>;

    /// Entries written for a job, oldest first
    async fn list_for_job(&self, job_id: &str) -> Result<Vec<LedgerEntry>>;
}

/// Trait for completed-job lookup
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Job by id
    async fn find_job(&self, job_id: &str) -> Result<Option<Job>>;

    /// Worker ids assigned to the job, in assignment order
    async fn assigned_workers(&self, job_id: &str) -> Result<Vec<String>>;
}
