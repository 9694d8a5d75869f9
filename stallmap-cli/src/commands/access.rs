//! Shared flow for the login commands: collect, log in, fetch, show, save.

use anyhow::{Context, Result};
use clap::Args;
use stallmap_core::{AccessRequest, BaseUrl, CredentialSource, Credentials, StallMap, StaticSource};
use stallmap_fetch::{AccessContext, AccessPipeline};
use stallmap_store::{save_stalls, Config};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::output::{JsonFormatter, TextFormatter};
use crate::prompt::{BrowserPlan, InteractiveSource, PromptPlan, UrlAnswer};
use crate::{Cli, OutputFormat};

/// Environment variable holding the login email.
pub const EMAIL_ENV: &str = "STALLMAP_EMAIL";

/// Environment variable holding the login password.
pub const PASSWORD_ENV: &str = "STALLMAP_PASSWORD";

// ============================================================================
// Arguments
// ============================================================================

/// Arguments shared by the login commands.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Backend base URL [default: from config, http://localhost:8080].
    #[arg(long, value_name = "URL")]
    pub backend: Option<String>,

    /// Employee email.
    #[arg(long, short = 'e', env = EMAIL_ENV)]
    pub email: Option<String>,

    /// Employee password. Prefer the environment variable.
    #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,

    /// Where to save the stall data [default: stall_map_data.json].
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the stalls without saving them.
    #[arg(long, conflicts_with = "output")]
    pub no_save: bool,

    /// HTTP request timeout in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl RunArgs {
    /// Arguments for a bare `stallmap`: defaults plus the credential
    /// environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            email: var(EMAIL_ENV),
            password: var(PASSWORD_ENV),
            ..Self::default()
        }
    }
}

/// Browser-only choices made on the command line.
#[derive(Debug, Clone, Default)]
pub struct BrowserChoice {
    /// Frontend base URL, if given.
    pub frontend: Option<String>,
    /// Forced window mode, if given.
    pub headless: Option<bool>,
}

// ============================================================================
// Config
// ============================================================================

/// Loads the config named by `--config`, or the default one.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    Config::load_from(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

// ============================================================================
// Credential Collection
// ============================================================================

/// Builds the request without prompting when email and password are both
/// known. Returns `None` when something has to be asked.
pub fn static_request(
    args: &RunArgs,
    browser: Option<&BrowserChoice>,
    config: &Config,
) -> Result<Option<AccessRequest>> {
    let (Some(email), Some(password)) = (&args.email, &args.password) else {
        return Ok(None);
    };

    let backend = BaseUrl::parse(args.backend.as_deref().unwrap_or(&config.backend_url))?;
    let mut request = AccessRequest::new(backend, Credentials::new(email, password.as_str())?);

    if let Some(browser) = browser {
        let frontend =
            BaseUrl::parse(browser.frontend.as_deref().unwrap_or(&config.frontend_url))?;
        request = request
            .with_frontend(frontend)
            .with_headless(browser.headless.unwrap_or(config.browser.headless));
    }

    let mut source = StaticSource::new(request);
    debug!(source = source.name(), "Collecting credentials");
    Ok(Some(source.collect()?))
}

/// What the interactive source has to ask. Config values become the
/// defaults shown in the prompts.
pub fn prompt_plan(args: &RunArgs, browser: Option<&BrowserChoice>, config: &Config) -> PromptPlan {
    let answer = |given: Option<&String>, default: &str| match given {
        Some(url) => UrlAnswer::Given(url.clone()),
        None => UrlAnswer::Ask {
            default: default.to_string(),
        },
    };

    PromptPlan {
        backend: answer(args.backend.as_ref(), &config.backend_url),
        browser: browser.map(|b| BrowserPlan {
            frontend: answer(b.frontend.as_ref(), &config.frontend_url),
            headless: b.headless,
            headless_default: config.browser.headless,
        }),
        email: args.email.clone(),
        password: args.password.clone(),
    }
}

/// Collects the access request, prompting on the terminal if needed.
pub async fn collect_request(
    args: &RunArgs,
    browser: Option<&BrowserChoice>,
    config: &Config,
) -> Result<AccessRequest> {
    if let Some(request) = static_request(args, browser, config)? {
        return Ok(request);
    }

    let plan = prompt_plan(args, browser, config);

    // Blocking reads stay off the runtime so Ctrl-C is still noticed.
    let request = tokio::task::spawn_blocking(move || {
        let mut source = InteractiveSource::terminal(plan);
        debug!(source = source.name(), "Collecting credentials");
        source.collect()
    })
    .await??;

    Ok(request)
}

// ============================================================================
// Run
// ============================================================================

/// Logs in, fetches, prints and saves.
pub async fn execute(
    pipeline: &AccessPipeline,
    ctx: &AccessContext,
    request: &AccessRequest,
    args: &RunArgs,
    config: &Config,
    cli: &Cli,
) -> Result<()> {
    if !cli.quiet {
        eprintln!(
            "Logging in as {} ({} login)...",
            request.credentials.email,
            pipeline.authenticator().kind()
        );
    }

    let outcome = pipeline.execute(ctx, request).await?;
    info!(
        authenticator = %outcome.authenticator_id,
        stalls = outcome.stalls.len(),
        duration = ?outcome.duration(),
        "Stalls retrieved"
    );

    print_stalls(&outcome.stalls, cli)?;

    if args.no_save {
        debug!("Saving skipped");
        return Ok(());
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_path.clone());
    let written = save_stalls(&path, &outcome.stalls)
        .await
        .with_context(|| format!("failed to save stall data to {}", path.display()))?;

    if !cli.quiet {
        match cli.format {
            OutputFormat::Text => println!("\n  Full data saved → {}", written.display()),
            OutputFormat::Json => eprintln!("Full data saved → {}", written.display()),
        }
    }

    Ok(())
}

fn print_stalls(stalls: &StallMap, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_report(stalls));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_stalls(stalls)?);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
