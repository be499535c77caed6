//! # TidyHome Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for tiers, fees, payouts, the ledger and jobs
//! - The HTTP payment gateway adapter
//! - HTTP client with retries
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `tidyhome-core`
//! - Maps driver errors into `TidyHomeError` at the boundary
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod errors;
pub mod gateway;
pub mod http;

// Re-export commonly used items
pub use database::*;
pub use errors::{to_domain, InfraError};
pub use gateway::HttpPaymentGateway;
pub use http::{HttpClient, HttpClientBuilder, RetryPolicy};
