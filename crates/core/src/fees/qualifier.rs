//! Fee tier qualifier
//!
//! Decides the platform fee percentage for jobs billed to a business
//! account. Businesses completing at least `large_business_threshold` jobs
//! in the trailing window get the discounted large-business rate.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use tidyhome_domain::{BusinessFee, FeeConfig, FeeTier, Result};
use tracing::{debug, instrument};

use super::ports::VolumeStatsRepository;
use crate::config_ports::{resolve_fee_config, ConfigStore};

/// Calendar month key (`YYYY-MM`) used by volume statistics.
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// First month of a trailing window of `lookback_months` calendar months
/// ending with the month of `now`.
///
/// A lookback of zero is treated as the current month only.
pub fn window_start(now: DateTime<Utc>, lookback_months: u32) -> String {
    let back = lookback_months.saturating_sub(1);
    let first_of_month = NaiveDate::from_ymd_opt(now.year(), now.month(), 1);
    match first_of_month.and_then(|d| d.checked_sub_months(Months::new(back))) {
        Some(start) => format!("{:04}-{:02}", start.year(), start.month()),
        None => month_key(now),
    }
}

/// Fee decision for a business given its trailing completed-job count.
pub fn qualify(completed_jobs: u32, config: &FeeConfig) -> BusinessFee {
    let qualifies = completed_jobs >= config.large_business_threshold;
    let (fee_percent, fee_tier) = if qualifies {
        (config.large_business_fee_percent, FeeTier::LargeBusiness)
    } else {
        (config.business_fee_percent, FeeTier::Standard)
    };

    BusinessFee {
        fee_percent,
        fee_tier,
        qualifies,
        cleanings_needed: config.large_business_threshold.saturating_sub(completed_jobs),
    }
}

/// Resolves business and individual platform fees.
pub struct FeeTierQualifier {
    config: Arc<dyn ConfigStore>,
    volume: Arc<dyn VolumeStatsRepository>,
}

impl FeeTierQualifier {
    pub fn new(config: Arc<dyn ConfigStore>, volume: Arc<dyn VolumeStatsRepository>) -> Self {
        Self { config, volume }
    }

    /// Fee for a business as of now.
    pub async fn get_business_fee(&self, business_id: &str) -> Result<BusinessFee> {
        self.get_business_fee_at(business_id, Utc::now()).await
    }

    /// Fee for a business with the lookback window anchored at `now`.
    #[instrument(skip(self))]
    pub async fn get_business_fee_at(
        &self,
        business_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BusinessFee> {
        let config = resolve_fee_config(self.config.as_ref()).await?;
        let from_month = window_start(now, config.lookback_months);
        let completed = self.volume.completed_jobs_since(business_id, &from_month).await?;
        let fee = qualify(completed, &config);

        debug!(
            from_month = %from_month,
            completed_jobs = completed,
            fee_tier = %fee.fee_tier,
            fee_percent = %fee.fee_percent,
            "business fee resolved"
        );
        Ok(fee)
    }

    /// Fee percentage for jobs performed by individual contractors.
    pub async fn individual_fee(&self) -> Result<Decimal> {
        Ok(resolve_fee_config(self.config.as_ref()).await?.individual_fee_percent)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tidyhome_domain::DEFAULT_FEE_CONFIG;

    use super::*;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(at(2026, 3, 15)), "2026-03");
        assert_eq!(month_key(at(2026, 11, 1)), "2026-11");
    }

    #[test]
    fn window_covers_current_month_for_single_lookback() {
        assert_eq!(window_start(at(2026, 3, 31), 1), "2026-03");
        assert_eq!(window_start(at(2026, 3, 31), 0), "2026-03");
    }

    #[test]
    fn window_crosses_year_boundary() {
        assert_eq!(window_start(at(2026, 2, 10), 3), "2025-12");
        assert_eq!(window_start(at(2026, 1, 31), 13), "2025-01");
    }

    #[test]
    fn below_threshold_pays_standard_rate() {
        let fee = qualify(42, &DEFAULT_FEE_CONFIG);

        assert_eq!(fee.fee_tier, FeeTier::Standard);
        assert_eq!(fee.fee_percent, dec!(15));
        assert!(!fee.qualifies);
        assert_eq!(fee.cleanings_needed, 8);
    }

    #[test]
    fn threshold_is_inclusive() {
        let fee = qualify(50, &DEFAULT_FEE_CONFIG);

        assert_eq!(fee.fee_tier, FeeTier::LargeBusiness);
        assert_eq!(fee.fee_percent, dec!(12));
        assert!(fee.qualifies);
        assert_eq!(fee.cleanings_needed, 0);
    }

    #[test]
    fn cleanings_needed_never_negative() {
        assert_eq!(qualify(500, &DEFAULT_FEE_CONFIG).cleanings_needed, 0);
    }
}
