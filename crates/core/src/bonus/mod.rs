//! Preferred-home bonus applied to the platform fee

pub mod engine;

pub use engine::{split_with_tier, split_without_bonus, BonusEngine};
