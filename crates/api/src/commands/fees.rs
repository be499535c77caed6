//! Business fee commands

use std::time::Instant;

use tidyhome_domain::{BusinessFee, Result as DomainResult};
use tracing::info;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Fee percentage a business would be charged on a payout run now.
pub async fn business_fee(ctx: &AppContext, business_id: &str) -> DomainResult<BusinessFee> {
    let command_name = "fees::business_fee";
    let start = Instant::now();
    info!(command = command_name, business_id, "Executing business_fee");

    let result = ctx.fees.get_business_fee(business_id).await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
