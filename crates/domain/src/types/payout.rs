//! Payout records and orchestration results

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tier::Tier;
use crate::constants::{DEFAULT_PAYOUT_HOURS, TRANSFER_IDEMPOTENCY_PREFIX};
use crate::errors::TidyHomeError;
use crate::impl_domain_status_conversions;
use crate::money::{cents_to_dollars, Cents};

/// Lifecycle of a payout row.
///
/// `pending/absent -> processing -> completed | failed`, and `failed ->
/// processing` when a later run retries the worker. A transfer the gateway
/// accepted after its run gave up on it still settles a `failed` row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl_domain_status_conversions!(PayoutStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

impl PayoutStatus {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Processing, Self::Completed, Self::Failed];

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `processing -> processing` is allowed so that a run interrupted after
    /// the upsert can be picked up again.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending | Self::Processing | Self::Failed, Self::Processing)
                | (Self::Processing | Self::Failed, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }

    /// States from which `next` can be reached.
    pub fn sources_of(next: Self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |from| from.can_transition_to(next))
    }

    /// Completed payouts are never transferred again.
    pub fn is_paid(self) -> bool {
        self == Self::Completed
    }
}

/// Payout processing priority at the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutPriority {
    #[default]
    Normal,
    High,
}

impl_domain_status_conversions!(PayoutPriority {
    Normal => "normal",
    High => "high",
});

/// Fee split for one worker on one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusResult {
    pub is_preferred_job: bool,
    pub bonus_applied: bool,
    pub bonus_percent: Decimal,
    pub bonus_amount_cents: Cents,
    /// Platform fee before the bonus is taken out of it.
    pub original_platform_fee_cents: Cents,
    pub adjusted_platform_fee_cents: Cents,
    pub adjusted_net_amount_cents: Cents,
    pub tier: Option<Tier>,
    pub faster_payouts: bool,
    pub payout_hours: Option<u32>,
}

impl BonusResult {
    /// Result for a job where no share of the fee is returned.
    pub fn without_bonus(
        gross_cents: Cents,
        platform_fee_cents: Cents,
        is_preferred_job: bool,
        tier: Option<Tier>,
    ) -> Self {
        Self {
            is_preferred_job,
            bonus_applied: false,
            bonus_percent: Decimal::ZERO,
            bonus_amount_cents: 0,
            original_platform_fee_cents: platform_fee_cents,
            adjusted_platform_fee_cents: platform_fee_cents,
            adjusted_net_amount_cents: gross_cents - platform_fee_cents,
            tier,
            faster_payouts: false,
            payout_hours: None,
        }
    }

    pub fn payout_priority(&self) -> PayoutPriority {
        if self.faster_payouts {
            PayoutPriority::High
        } else {
            PayoutPriority::Normal
        }
    }

    pub fn expected_payout_hours(&self) -> u32 {
        self.payout_hours.unwrap_or(DEFAULT_PAYOUT_HOURS)
    }
}

/// One worker's compensation for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: String,
    pub job_id: String,
    pub worker_id: String,
    /// Net amount transferred to the worker, after bonus.
    pub amount_cents: Cents,
    /// Platform fee retained, after bonus.
    pub platform_fee_cents: Cents,
    pub currency: String,
    pub status: PayoutStatus,
    pub is_preferred_home_job: bool,
    pub preferred_bonus_applied: bool,
    pub preferred_bonus_percent: Decimal,
    pub preferred_bonus_amount_cents: Cents,
    pub tier_at_payout: Option<Tier>,
    pub payout_priority: PayoutPriority,
    pub expected_payout_hours: u32,
    pub transfer_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub paid_at: Option<i64>,
    /// Transfer attempt the idempotency key belongs to. Bumped when the
    /// gateway definitively declines, so a retry is not answered from the
    /// declined request's cached result.
    pub attempt: u32,
}

impl Payout {
    /// Build the `processing` row written before the gateway is contacted.
    pub fn processing(
        job_id: impl Into<String>,
        worker_id: impl Into<String>,
        currency: impl Into<String>,
        bonus: &BonusResult,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            job_id: job_id.into(),
            worker_id: worker_id.into(),
            amount_cents: bonus.adjusted_net_amount_cents,
            platform_fee_cents: bonus.adjusted_platform_fee_cents,
            currency: currency.into(),
            status: PayoutStatus::Processing,
            is_preferred_home_job: bonus.is_preferred_job,
            preferred_bonus_applied: bonus.bonus_applied,
            preferred_bonus_percent: bonus.bonus_percent,
            preferred_bonus_amount_cents: bonus.bonus_amount_cents,
            tier_at_payout: bonus.tier,
            payout_priority: bonus.payout_priority(),
            expected_payout_hours: bonus.expected_payout_hours(),
            transfer_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
            attempt: 1,
        }
    }

    /// Returns false, leaving the row untouched, when it cannot complete.
    pub fn mark_completed(&mut self, transfer_id: impl Into<String>, now: i64) -> bool {
        if !self.status.can_transition_to(PayoutStatus::Completed) {
            return false;
        }
        self.status = PayoutStatus::Completed;
        self.transfer_id = Some(transfer_id.into());
        self.failure_reason = None;
        self.updated_at = now;
        self.paid_at = Some(now);
        true
    }

    /// Record a failed transfer. Only definitive declines move the row to a
    /// fresh attempt; timeouts and network errors keep the key so the next
    /// run learns what the gateway actually did.
    pub fn mark_failed(&mut self, error: &TidyHomeError, now: i64) -> bool {
        if !self.status.can_transition_to(PayoutStatus::Failed) {
            return false;
        }
        self.status = PayoutStatus::Failed;
        self.failure_reason = Some(error.to_string());
        self.updated_at = now;
        if rotates_key(error) {
            self.attempt += 1;
        }
        true
    }

    /// Idempotency key sent to the gateway for this attempt.
    pub fn idempotency_key(&self) -> String {
        format!("{TRANSFER_IDEMPOTENCY_PREFIX}-{}-{}-{}", self.job_id, self.worker_id, self.attempt)
    }
}

/// Whether a transfer failure is final enough to retry under a new key.
pub fn rotates_key(error: &TidyHomeError) -> bool {
    !error.is_retryable()
}

/// Per-worker entry of the orchestration summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPayoutResult {
    pub worker_id: String,
    pub success: bool,
    /// Net amount in dollars.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerPayoutResult {
    pub fn paid(
        worker_id: impl Into<String>,
        amount_cents: Cents,
        transfer_id: impl Into<String>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            success: true,
            amount: Some(cents_to_dollars(amount_cents)),
            transfer_id: Some(transfer_id.into()),
            error: None,
        }
    }

    pub fn failed(worker_id: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            worker_id: worker_id.into(),
            success: false,
            amount: None,
            transfer_id: None,
            error: Some(error.to_string()),
        }
    }
}

/// Summary returned to the job-completion workflow.
///
/// `success` is true when any worker was paid; callers must inspect
/// `payouts` to detect partial failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub success: bool,
    pub payouts: Vec<WorkerPayoutResult>,
}

impl OrchestrationResult {
    pub fn from_payouts(payouts: Vec<WorkerPayoutResult>) -> Self {
        let success = payouts.iter().any(|p| p.success);
        Self { success, payouts }
    }

    /// Workers whose payout did not go through in this run.
    pub fn failed_workers(&self) -> impl Iterator<Item = &str> {
        self.payouts.iter().filter(|p| !p.success).map(|p| p.worker_id.as_str())
    }

    pub fn for_worker(&self, worker_id: &str) -> Option<&WorkerPayoutResult> {
        self.payouts.iter().find(|p| p.worker_id == worker_id)
    }
}
