//! # TidyHome Domain
//!
//! Business domain types and models for the TidyHome payout core.
//!
//! This crate contains:
//! - Tier, fee, payout, ledger and job types
//! - Domain error types and Result definitions
//! - Application configuration structures
//! - Default business configuration and money helpers
//!
//! ## Architecture
//! - No dependencies on other TidyHome crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod money;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
