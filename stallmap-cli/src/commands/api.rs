//! Api command - log in through the REST API.

use anyhow::Result;
use stallmap_fetch::{AccessContext, AccessPipeline, ApiAuthenticator, StallFetcher};
use std::time::Duration;
use tracing::debug;

use super::access::{self, RunArgs};
use crate::Cli;

/// Runs the api command.
pub async fn run(args: &RunArgs, cli: &Cli) -> Result<()> {
    let config = access::load_config(cli)?;
    let request = access::collect_request(args, None, &config).await?;

    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.request_timeout_secs));
    debug!(backend = %request.backend, timeout = ?timeout, "Building API pipeline");

    let ctx = AccessContext::builder().timeout(timeout).build()?;
    let pipeline = AccessPipeline::new(
        Box::new(ApiAuthenticator::new()),
        Box::new(StallFetcher::new(ctx.http.clone())),
    );

    access::execute(&pipeline, &ctx, &request, args, &config, cli).await
}
