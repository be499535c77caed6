//! Tier calculator
//!
//! Maps a worker's preferred-site count to a tier. Bands are checked from the
//! top down and the first match wins, so an overlapping configuration
//! resolves in favour of the highest tier whose minimum is met. Bronze is the
//! fallback for every count that matches nothing else.

use tidyhome_domain::constants::DEFAULT_PAYOUT_HOURS;
use tidyhome_domain::{Tier, TierConfig, TierResult};

/// Resolve the tier for `count` preferred-site relationships.
pub fn calculate_tier(count: u32, config: &TierConfig) -> TierResult {
    if count >= config.platinum.min {
        return TierResult {
            tier: Tier::Platinum,
            bonus_percent: config.platinum.bonus_percent,
            faster_payouts: config.platinum_faster_payouts,
            payout_hours: config.platinum_payout_hours,
            early_access: config.platinum_early_access,
        };
    }

    if config.gold.contains(count) {
        return TierResult {
            tier: Tier::Gold,
            bonus_percent: config.gold.bonus_percent,
            faster_payouts: config.gold_faster_payouts,
            payout_hours: config.gold_payout_hours,
            early_access: false,
        };
    }

    if config.silver.contains(count) {
        return standard_perks(Tier::Silver, config.silver.bonus_percent);
    }

    standard_perks(Tier::Bronze, config.bronze.bonus_percent)
}

fn standard_perks(tier: Tier, bonus_percent: rust_decimal::Decimal) -> TierResult {
    TierResult {
        tier,
        bonus_percent,
        faster_payouts: false,
        payout_hours: DEFAULT_PAYOUT_HOURS,
        early_access: false,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use tidyhome_domain::{TierBand, DEFAULT_TIER_CONFIG};

    use super::*;

    #[test]
    fn default_boundaries_resolve_expected_tiers() {
        let cases = [
            (0, Tier::Bronze),
            (2, Tier::Bronze),
            (3, Tier::Silver),
            (5, Tier::Silver),
            (6, Tier::Gold),
            (9, Tier::Gold),
            (10, Tier::Platinum),
            (500, Tier::Platinum),
        ];

        for (count, expected) in cases {
            assert_eq!(
                calculate_tier(count, &DEFAULT_TIER_CONFIG).tier,
                expected,
                "count {count}"
            );
        }
    }

    #[test]
    fn perks_follow_tier() {
        let silver = calculate_tier(4, &DEFAULT_TIER_CONFIG);
        assert_eq!(silver.bonus_percent, dec!(3));
        assert!(!silver.faster_payouts);
        assert_eq!(silver.payout_hours, 48);
        assert!(!silver.early_access);

        let gold = calculate_tier(7, &DEFAULT_TIER_CONFIG);
        assert_eq!(gold.bonus_percent, dec!(5));
        assert!(gold.faster_payouts);
        assert_eq!(gold.payout_hours, 24);
        assert!(!gold.early_access);

        let platinum = calculate_tier(12, &DEFAULT_TIER_CONFIG);
        assert!(platinum.faster_payouts);
        assert_eq!(platinum.payout_hours, 12);
        assert!(platinum.early_access);
    }

    #[test]
    fn silver_never_gets_faster_payouts_even_if_gold_does() {
        let mut config = DEFAULT_TIER_CONFIG;
        config.gold_payout_hours = 6;
        let silver = calculate_tier(3, &config);
        assert!(!silver.faster_payouts);
        assert_eq!(silver.payout_hours, 48);
    }

    #[test]
    fn overlapping_bands_resolve_to_highest_tier() {
        let mut config = DEFAULT_TIER_CONFIG;
        config.platinum = TierBand::new(8, None, dec!(9));

        // 8 and 9 are inside gold's band too; platinum is checked first.
        assert_eq!(calculate_tier(8, &config).tier, Tier::Platinum);
        assert_eq!(calculate_tier(7, &config).tier, Tier::Gold);
    }

    #[test]
    fn gaps_fall_back_to_bronze() {
        let mut config = DEFAULT_TIER_CONFIG;
        config.gold = TierBand::new(7, Some(9), dec!(5));

        let result = calculate_tier(6, &config);
        assert_eq!(result.tier, Tier::Bronze);
        assert_eq!(result.bonus_percent, config.bronze.bonus_percent);
    }

    #[test]
    fn configured_bronze_bonus_is_used() {
        let mut config = DEFAULT_TIER_CONFIG;
        config.bronze = TierBand::new(0, Some(2), dec!(1.5));
        assert_eq!(calculate_tier(1, &config).bonus_percent, dec!(1.5));
    }

    fn contiguous_config() -> impl Strategy<Value = TierConfig> {
        (0u32..20, 1u32..20, 1u32..20).prop_map(|(bronze_span, silver_span, gold_span)| {
            let silver_min = bronze_span + 1;
            let gold_min = silver_min + silver_span;
            let platinum_min = gold_min + gold_span;
            TierConfig {
                bronze: TierBand::new(0, Some(bronze_span), dec!(0)),
                silver: TierBand::new(silver_min, Some(gold_min - 1), dec!(3)),
                gold: TierBand::new(gold_min, Some(platinum_min - 1), dec!(5)),
                platinum: TierBand::new(platinum_min, None, dec!(7)),
                ..DEFAULT_TIER_CONFIG
            }
        })
    }

    proptest! {
        #[test]
        fn every_count_resolves_to_a_tier(count in any::<u32>(), config in contiguous_config()) {
            let result = calculate_tier(count, &config);
            prop_assert!(matches!(
                result.tier,
                Tier::Bronze | Tier::Silver | Tier::Gold | Tier::Platinum
            ));
        }

        #[test]
        fn tier_is_monotonic_in_count(
            count in 0u32..100,
            step in 0u32..50,
            config in contiguous_config(),
        ) {
            let lower = calculate_tier(count, &config).tier;
            let higher = calculate_tier(count + step, &config).tier;
            prop_assert!(higher >= lower);
        }
    }
}
