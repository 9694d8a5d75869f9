//! Browser command - log in through the web front end in Chromium.

use anyhow::Result;
use clap::Args;
use stallmap_fetch::{
    AccessContext, AccessPipeline, AccessSettings, BrowserAuthenticator, ChromeLauncher,
    StallFetcher,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::access::{self, BrowserChoice, RunArgs};
use crate::Cli;

/// Arguments for the browser command.
#[derive(Args, Debug, Clone, Default)]
pub struct BrowserArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Frontend base URL [default: from config, http://localhost:5173].
    #[arg(long, value_name = "URL")]
    pub frontend: Option<String>,

    /// Hide the browser window without asking.
    #[arg(long, conflicts_with = "headed")]
    pub headless: bool,

    /// Show the browser window without asking.
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable [default: searched on PATH].
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Seconds to wait for the dashboard after submitting the login form.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub navigation_timeout: Option<u64>,
}

impl BrowserArgs {
    fn choice(&self) -> BrowserChoice {
        let headless = match (self.headless, self.headed) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        BrowserChoice {
            frontend: self.frontend.clone(),
            headless,
        }
    }
}

/// Runs the browser command.
pub async fn run(args: &BrowserArgs, cli: &Cli) -> Result<()> {
    let config = access::load_config(cli)?;
    let choice = args.choice();
    let request = access::collect_request(&args.run, Some(&choice), &config).await?;

    let mut settings = AccessSettings::browser().with_navigation_timeout(Duration::from_secs(
        args.navigation_timeout
            .unwrap_or(config.browser.navigation_timeout_secs),
    ));
    if let Some(secs) = args.run.timeout {
        settings = settings.with_request_timeout(Duration::from_secs(secs));
    }

    let launcher = match args.chrome.as_ref().or(config.browser.chrome_path.as_ref()) {
        Some(path) => ChromeLauncher::with_executable(path),
        None => ChromeLauncher::new(),
    };
    debug!(
        frontend = %request.frontend,
        headless = request.headless,
        settings = ?settings,
        "Building browser pipeline"
    );

    let ctx = AccessContext::builder().settings(settings).build()?;
    let pipeline = AccessPipeline::new(
        Box::new(BrowserAuthenticator::new(Arc::new(launcher))),
        Box::new(StallFetcher::new(ctx.http.clone())),
    );

    access::execute(&pipeline, &ctx, &request, &args.run, &config, cli).await
}
