//! Integer-cent arithmetic shared by the bonus engine and the orchestrator.
//!
//! Every intermediate amount is rounded to whole cents with "round half away
//! from zero" before it feeds the next step. The platform fee is rounded
//! first and the bonus is then taken from that rounded fee.

use std::num::NonZeroUsize;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Amount of money in the smallest currency unit.
pub type Cents = i64;

/// Round a decimal amount of cents to a whole number of cents.
pub fn round_cents(value: Decimal) -> Cents {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() { Cents::MIN } else { Cents::MAX })
}

/// `round(amount * percent / 100)`.
pub fn percent_of(amount: Cents, percent: Decimal) -> Cents {
    round_cents(Decimal::from(amount) * percent / Decimal::ONE_HUNDRED)
}

/// Equal share of `total` for each of `parts` recipients.
///
/// Each share is rounded independently; `share * parts` may differ from
/// `total` by a few cents and nothing reconciles the remainder.
pub fn split_evenly(total: Cents, parts: NonZeroUsize) -> Cents {
    round_cents(Decimal::from(total) / Decimal::from(parts.get()))
}

/// Convert cents into a two-decimal dollar amount.
pub fn cents_to_dollars(amount: Cents) -> Decimal {
    Decimal::new(amount, 2)
}
