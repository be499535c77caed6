//! Payout orchestrator
//!
//! Turns a completed job into one transfer per assigned worker. Each worker
//! is an independent unit of work: a missing payee account or a rejected
//! transfer fails that worker only, while persistence errors abort the call.

use std::collections::BTreeMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use tidyhome_domain::constants::{
    DEFAULT_CURRENCY, DEFAULT_GATEWAY_TIMEOUT_SECS, DEFAULT_PAYOUT_CONCURRENCY,
};
use tidyhome_domain::money::{split_evenly, Cents};
use tidyhome_domain::{
    Job, LedgerEntry, OrchestrationResult, Payout, Result, TidyHomeError, WorkerPayoutResult,
};
use tracing::{debug, info, instrument, warn};

use super::locks::JobLocks;
use super::ports::{
    Charge, JobRepository, LedgerRepository, PayeeAccountRepository, PaymentGateway,
    PayoutRepository, TransferRequest,
};
use crate::bonus::BonusEngine;
use crate::fees::{month_key, FeeTierQualifier, VolumeStatsRepository};

/// Collaborators of the orchestrator.
#[derive(Clone)]
pub struct PayoutDependencies {
    pub jobs: Arc<dyn JobRepository>,
    pub payouts: Arc<dyn PayoutRepository>,
    pub payee_accounts: Arc<dyn PayeeAccountRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub volume: Arc<dyn VolumeStatsRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub bonus: Arc<BonusEngine>,
    pub fees: Arc<FeeTierQualifier>,
}

/// Runtime knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Worker pipelines in flight at once; 1 runs them sequentially.
    pub max_concurrency: usize,
    /// Deadline for one gateway call, HTTP retries included.
    pub gateway_timeout: Duration,
    /// Currency for jobs that do not carry one.
    pub default_currency: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_PAYOUT_CONCURRENCY,
            gateway_timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Values shared by every worker of one run.
struct RunContext<'a> {
    job: &'a Job,
    charge: Charge,
    gross_per_worker: Cents,
    fee_percent: Decimal,
    currency: &'a str,
}

/// Distributes a completed job's charge among its workers.
pub struct PayoutOrchestrator {
    deps: PayoutDependencies,
    settings: OrchestratorSettings,
    locks: JobLocks,
}

impl PayoutOrchestrator {
    pub fn new(deps: PayoutDependencies, settings: OrchestratorSettings) -> Self {
        Self { deps, settings, locks: JobLocks::new() }
    }

    /// Load a job and its assigned workers, then pay them.
    ///
    /// # Errors
    /// `NotFound` when the job does not exist, plus everything
    /// [`Self::process_job_payout`] returns.
    pub async fn process_job(&self, job_id: &str) -> Result<OrchestrationResult> {
        let job = self
            .deps
            .jobs
            .find_job(job_id)
            .await?
            .ok_or_else(|| TidyHomeError::NotFound(format!("job {job_id}")))?;
        let workers = self.deps.jobs.assigned_workers(job_id).await?;
        self.process_job_payout(&job, &workers).await
    }

    /// Pay every assigned worker their share of the job.
    ///
    /// Results are returned in the order of `worker_ids`. Re-running for the
    /// same job is safe: completed payouts are reported again without a new
    /// transfer, failed ones are retried.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty worker list, a negative charge or a job
    ///   without a charge reference
    /// - gateway errors while retrieving the charge
    /// - any persistence error raised while paying a worker
    #[instrument(skip(self, job, worker_ids), fields(job_id = %job.id, workers = worker_ids.len()))]
    pub async fn process_job_payout(
        &self,
        job: &Job,
        worker_ids: &[String],
    ) -> Result<OrchestrationResult> {
        let Some(worker_count) = NonZeroUsize::new(worker_ids.len()) else {
            return Err(TidyHomeError::InvalidInput(format!(
                "job {} has no assigned workers",
                job.id
            )));
        };
        if job.amount_charged_cents < 0 {
            return Err(TidyHomeError::InvalidInput(format!(
                "job {} has a negative charge of {}",
                job.id, job.amount_charged_cents
            )));
        }
        let Some(charge_ref) = job.charge_ref.as_deref() else {
            return Err(TidyHomeError::InvalidInput(format!(
                "job {} has no charge reference",
                job.id
            )));
        };

        let _lock = self.locks.acquire(&job.id).await;

        let charge = self
            .with_timeout("retrieve charge", self.deps.gateway.retrieve_charge(charge_ref))
            .await?;
        let fee_percent = match job.business_id.as_deref() {
            Some(business_id) => self.deps.fees.get_business_fee(business_id).await?.fee_percent,
            None => self.deps.fees.individual_fee().await?,
        };

        let run = RunContext {
            job,
            charge,
            gross_per_worker: split_evenly(job.amount_charged_cents, worker_count),
            fee_percent,
            currency: if job.currency.trim().is_empty() {
                &self.settings.default_currency
            } else {
                &job.currency
            },
        };
        debug!(
            gross_per_worker = run.gross_per_worker,
            fee_percent = %run.fee_percent,
            "payout run prepared"
        );

        let outcomes: Vec<Result<WorkerPayoutResult>> = stream::iter(worker_ids)
            .map(|worker_id| self.pay_worker(&run, worker_id))
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let payouts = outcomes.into_iter().collect::<Result<Vec<_>>>()?;
        let result = OrchestrationResult::from_payouts(payouts);

        info!(
            success = result.success,
            failed = result.failed_workers().count(),
            "job payout finished"
        );
        Ok(result)
    }

    async fn pay_worker(
        &self,
        run: &RunContext<'_>,
        worker_id: &str,
    ) -> Result<WorkerPayoutResult> {
        let job = run.job;

        if let Some(existing) = self.deps.payouts.find(&job.id, worker_id).await? {
            if existing.status.is_paid() {
                debug!(worker_id, payout_id = %existing.id, "payout already completed");
                return Ok(settled(worker_id, existing));
            }
        }

        let Some(account) = self.deps.payee_accounts.find(worker_id).await? else {
            let error = TidyHomeError::MissingPayeeAccount(worker_id.to_string());
            warn!(worker_id, "skipping worker without payee account");
            return Ok(WorkerPayoutResult::failed(worker_id, error));
        };

        let bonus = self
            .deps
            .bonus
            .calculate_payout_bonus(worker_id, &job.site_id, run.gross_per_worker, run.fee_percent)
            .await?;

        let mut payout = self
            .deps
            .payouts
            .upsert_processing(&Payout::processing(
                &job.id,
                worker_id,
                run.currency,
                &bonus,
                Utc::now().timestamp(),
            ))
            .await?;
        // Another process completed the row between the lookup and the upsert.
        if payout.status.is_paid() {
            debug!(worker_id, payout_id = %payout.id, "payout completed by another run");
            return Ok(settled(worker_id, payout));
        }

        let request = TransferRequest {
            amount_cents: payout.amount_cents,
            currency: payout.currency.clone(),
            destination: account.account_ref,
            linked_charge_id: run.charge.charge_id.clone(),
            idempotency_key: payout.idempotency_key(),
            metadata: transfer_metadata(&payout),
        };

        match self.with_timeout("transfer", self.deps.gateway.transfer(&request)).await {
            Ok(transfer) => {
                let now = Utc::now();
                let won = self
                    .deps
                    .payouts
                    .mark_completed(&payout.id, &transfer.transfer_id, now.timestamp())
                    .await?;
                if !won {
                    debug!(worker_id, payout_id = %payout.id, "payout settled by another run");
                    return self.stored_settlement(job, worker_id).await;
                }
                payout.mark_completed(&transfer.transfer_id, now.timestamp());

                self.deps
                    .ledger
                    .append(&[
                        LedgerEntry::payout_entry(&payout, now),
                        LedgerEntry::platform_fee_entry(&payout, now),
                    ])
                    .await?;

                if let Some(business_id) = job.business_id.as_deref() {
                    self.deps
                        .volume
                        .record_completed_job(
                            business_id,
                            &month_key(now),
                            run.gross_per_worker,
                            now.timestamp(),
                        )
                        .await?;
                }

                info!(
                    worker_id,
                    payout_id = %payout.id,
                    transfer_id = %transfer.transfer_id,
                    amount_cents = payout.amount_cents,
                    bonus_cents = payout.preferred_bonus_amount_cents,
                    "worker paid"
                );
                Ok(WorkerPayoutResult::paid(worker_id, payout.amount_cents, transfer.transfer_id))
            }
            Err(error) if error.is_persistence() => Err(error),
            Err(error) => {
                let failed_at = Utc::now().timestamp();
                let recorded = self.deps.payouts.mark_failed(&payout.id, &error, failed_at).await?;
                if !recorded {
                    let stored = self.deps.payouts.find(&job.id, worker_id).await?;
                    if let Some(stored) = stored.filter(|p| p.status.is_paid()) {
                        debug!(worker_id, payout_id = %stored.id, "payout settled by another run");
                        return Ok(settled(worker_id, stored));
                    }
                }
                payout.mark_failed(&error, failed_at);
                warn!(
                    worker_id,
                    payout_id = %payout.id,
                    retryable = error.is_retryable(),
                    next_attempt = payout.attempt,
                    error = %error,
                    "transfer failed"
                );
                Ok(WorkerPayoutResult::failed(worker_id, error))
            }
        }
    }

    /// Report the row another run completed while this run was waiting on
    /// the gateway.
    async fn stored_settlement(&self, job: &Job, worker_id: &str) -> Result<WorkerPayoutResult> {
        match self.deps.payouts.find(&job.id, worker_id).await? {
            Some(stored) if stored.status.is_paid() => Ok(settled(worker_id, stored)),
            Some(stored) => Err(TidyHomeError::Internal(format!(
                "payout {} left {} by a concurrent run",
                stored.id, stored.status
            ))),
            None => Err(TidyHomeError::NotFound(format!(
                "payout for job {} worker {worker_id}",
                job.id
            ))),
        }
    }

    async fn with_timeout<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        let limit = self.settings.gateway_timeout;
        tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
            Err(TidyHomeError::Timeout(format!("{operation} exceeded {}s", limit.as_secs_f64())))
        })
    }
}

fn settled(worker_id: &str, payout: Payout) -> WorkerPayoutResult {
    WorkerPayoutResult::paid(worker_id, payout.amount_cents, payout.transfer_id.unwrap_or_default())
}

fn transfer_metadata(payout: &Payout) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::from([
        ("job_id".to_string(), payout.job_id.clone()),
        ("worker_id".to_string(), payout.worker_id.clone()),
        ("payout_id".to_string(), payout.id.clone()),
        ("preferred_home".to_string(), payout.is_preferred_home_job.to_string()),
    ]);
    if payout.preferred_bonus_applied {
        metadata.insert("bonus_cents".to_string(), payout.preferred_bonus_amount_cents.to_string());
    }
    if let Some(tier) = payout.tier_at_payout {
        metadata.insert("tier".to_string(), tier.to_string());
    }
    metadata
}
