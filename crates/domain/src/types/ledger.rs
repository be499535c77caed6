//! Append-only ledger entries
//!
//! Every completed transfer produces two entries: the amount paid to the
//! worker and the fee the platform kept. Entries are never updated.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payout::Payout;
use crate::impl_domain_status_conversions;
use crate::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Payout,
    PlatformFee,
}

impl_domain_status_conversions!(LedgerEntryKind {
    Payout => "payout",
    PlatformFee => "platform_fee",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub job_id: String,
    pub worker_id: String,
    pub payout_id: String,
    pub kind: LedgerEntryKind,
    pub amount_cents: Cents,
    pub currency: String,
    /// Counted toward the worker's year-end earnings report.
    pub reportable: bool,
    pub tax_year: i32,
    pub transfer_id: Option<String>,
    pub created_at: i64,
}

impl LedgerEntry {
    /// Entry for the net amount transferred to the worker.
    pub fn payout_entry(payout: &Payout, now: DateTime<Utc>) -> Self {
        Self::from_payout(payout, LedgerEntryKind::Payout, payout.amount_cents, true, now)
    }

    /// Entry for the fee retained by the platform (after bonus).
    pub fn platform_fee_entry(payout: &Payout, now: DateTime<Utc>) -> Self {
        let fee = payout.platform_fee_cents;
        Self::from_payout(payout, LedgerEntryKind::PlatformFee, fee, false, now)
    }

    fn from_payout(
        payout: &Payout,
        kind: LedgerEntryKind,
        amount_cents: Cents,
        reportable: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            job_id: payout.job_id.clone(),
            worker_id: payout.worker_id.clone(),
            payout_id: payout.id.clone(),
            kind,
            amount_cents,
            currency: payout.currency.clone(),
            reportable,
            tax_year: now.year(),
            transfer_id: payout.transfer_id.clone(),
            created_at: now.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::payout::BonusResult;

    #[test]
    fn entries_split_payout_and_fee() {
        let bonus = BonusResult::without_bonus(10_000, 1_000, false, None);
        let mut payout = Payout::processing("job-1", "w-1", "usd", &bonus, 0);
        payout.mark_completed("tr_123", 0);

        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).single().unwrap();
        let paid = LedgerEntry::payout_entry(&payout, now);
        let fee = LedgerEntry::platform_fee_entry(&payout, now);

        assert_eq!(paid.kind, LedgerEntryKind::Payout);
        assert_eq!(paid.amount_cents, 9_000);
        assert!(paid.reportable);
        assert_eq!(paid.tax_year, 2025);
        assert_eq!(paid.transfer_id.as_deref(), Some("tr_123"));

        assert_eq!(fee.kind, LedgerEntryKind::PlatformFee);
        assert_eq!(fee.amount_cents, 1_000);
        assert!(!fee.reportable);
        assert_ne!(paid.id, fee.id);
    }
}
