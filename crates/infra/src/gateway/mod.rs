//! Payment gateway adapter
//!
//! Implements the core `PaymentGateway` port over a Stripe-compatible REST
//! API (form-encoded requests, bearer authentication, idempotency keys).

pub mod client;
mod types;

pub use client::HttpPaymentGateway;
