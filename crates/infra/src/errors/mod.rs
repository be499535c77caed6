//! Infrastructure error mapping

pub mod conversions;

pub use conversions::{to_domain, InfraError};
