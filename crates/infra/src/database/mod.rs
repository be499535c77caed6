//! Database implementations

mod blocking;
pub mod config_repository;
pub mod job_repository;
pub mod ledger_repository;
pub mod manager;
pub mod payee_account_repository;
pub mod payout_repository;
pub mod preferred_site_repository;
pub mod sqlite_pool;
pub mod tier_snapshot_repository;
pub mod volume_stats_repository;

pub use config_repository::*;
pub use job_repository::*;
pub use ledger_repository::*;
pub use manager::*;
pub use payee_account_repository::*;
pub use payout_repository::*;
pub use preferred_site_repository::*;
pub use sqlite_pool::*;
pub use tier_snapshot_repository::*;
pub use volume_stats_repository::*;
