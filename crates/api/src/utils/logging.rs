use std::time::Duration;

use tidyhome_domain::TidyHomeError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"payouts::process_job_payout"`).
/// * `elapsed` - Duration the command execution took.
/// * `error` - The error the command returned, if any.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&TidyHomeError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Convert a `TidyHomeError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &TidyHomeError) -> &'static str {
    match error {
        TidyHomeError::Database(_) => "database",
        TidyHomeError::Config(_) => "config",
        TidyHomeError::Network(_) => "network",
        TidyHomeError::Gateway(_) => "gateway",
        TidyHomeError::Timeout(_) => "timeout",
        TidyHomeError::MissingPayeeAccount(_) => "missing_payee_account",
        TidyHomeError::NotFound(_) => "not_found",
        TidyHomeError::InvalidInput(_) => "invalid_input",
        TidyHomeError::Internal(_) => "internal",
    }
}

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG` (default `info`). With `json` set, events are emitted
/// as one JSON object per line.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let result = if json { builder.json().try_init() } else { builder.try_init() };
    if let Err(err) = result {
        warn!(error = %err, "tracing subscriber already installed");
    }
}
