//! # TidyHome API
//!
//! Application layer - commands and the `tidyhome` entry point.
//!
//! This crate contains:
//! - Commands invoked by the job-completion workflow and operators
//! - Application context (dependency injection)
//! - Logging setup shared by the binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
