//! Payout commands

use std::time::Instant;

use tidyhome_domain::{OrchestrationResult, Result as DomainResult};
use tracing::info;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Pay every worker assigned to a completed job.
///
/// Safe to call again for the same job: completed payouts are reported
/// without a second transfer and failed ones are retried.
pub async fn process_job_payout(
    ctx: &AppContext,
    job_id: &str,
) -> DomainResult<OrchestrationResult> {
    let command_name = "payouts::process_job_payout";
    let start = Instant::now();
    info!(command = command_name, job_id, "Executing process_job_payout");

    let result = ctx.orchestrator.process_job(job_id).await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
