//! Commands - entry points for the job-completion workflow and operators

mod fees;
mod payouts;
mod tiers;

pub use fees::*;
pub use payouts::*;
pub use tiers::*;
