//! TidyHome - payout orchestration CLI
//!
//! ```text
//! tidyhome payout <job-id>       pay every worker assigned to a job
//! tidyhome tier <worker-id>      recalculate a worker's loyalty tier
//! tidyhome status <worker-id>    show a worker's stored tier
//! tidyhome fee <business-id>     show a business's current fee tier
//! ```

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tidyhome_api::utils::logging::init_tracing;
use tidyhome_api::{
    business_fee, process_job_payout, recalculate_worker_tier, worker_tier_status, AppContext,
};
use tidyhome_infra::config::env_bool;

const USAGE: &str = "usage: tidyhome <payout|tier|status|fee> <id>";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any configuration
    let dotenv = dotenvy::dotenv();

    init_tracing(env_bool("TIDYHOME_LOG_JSON", false));

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    let mut args = std::env::args().skip(1);
    let (Some(command), Some(id)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };

    let ctx = AppContext::from_env().context("failed to initialise application context")?;

    match command.as_str() {
        "payout" => {
            let result = process_job_payout(&ctx, &id).await?;
            print_json(&result)?;
            if !result.success {
                std::process::exit(2);
            }
        }
        "tier" => print_json(&recalculate_worker_tier(&ctx, &id).await?)?,
        "status" => print_json(&worker_tier_status(&ctx, &id).await?)?,
        "fee" => print_json(&business_fee(&ctx, &id).await?)?,
        other => bail!("unknown command `{other}`; {USAGE}"),
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render result")?;
    println!("{rendered}");
    Ok(())
}
