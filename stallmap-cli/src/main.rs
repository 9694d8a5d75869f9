// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `StallMap` CLI - employee stall map access from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in through the REST API (prompts for anything not given)
//! stallmap
//!
//! # Non-interactive API login
//! STALLMAP_EMAIL=emp1@example.com STALLMAP_PASSWORD=password123 stallmap api
//!
//! # Log in through the web front end in a visible browser
//! stallmap browser --headed
//!
//! # Raw JSON on stdout, nothing written to disk
//! stallmap api --format json --pretty --no-save
//!
//! # Write a config file with the defaults
//! stallmap config init
//! ```

mod commands;
mod output;
mod prompt;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{access::RunArgs, api, browser, config};

// ============================================================================
// CLI Definition
// ============================================================================

/// `StallMap` CLI - employee stall map access.
#[derive(Parser)]
#[command(name = "stallmap")]
#[command(about = "Employee stall map access tool")]
#[command(long_about = r#"
StallMap logs in to the employee stall service and shows the stall map.

Login variants:
  • api      POST /api/auth/signin on the backend (default)
  • browser  Fill the /employee/login form in Chromium

The stall list is printed and saved to stall_map_data.json.

Examples:
  stallmap                          # API login, prompts for credentials
  stallmap browser                  # Browser login
  stallmap api --format json        # Raw JSON output
  stallmap config show              # Show configuration
"#)]
#[command(version)]
#[command(author = "StallMap Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'api' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Configuration file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in through the REST API and fetch stalls (default).
    #[command(visible_alias = "a")]
    Api(RunArgs),

    /// Log in through the web front end in Chromium and fetch stalls.
    #[command(visible_alias = "b")]
    Browser(browser::BrowserArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable report with colors.
    #[default]
    Text,
    /// Raw stall JSON for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success, or cancelled by the user.
    Success = 0,
    /// Login, fetch, decode or file error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("stallmap=debug,info")
    } else {
        EnvFilter::new("stallmap=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Taken before any prompt can switch echo off.
    let terminal = terminal::TerminalMode::capture_tty();

    // Dropping the losing future releases any browser it holds.
    let result = tokio::select! {
        result = run(&cli) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match result {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => {
            if !cli.quiet {
                eprintln!("{}", error_report(&e));
            }
            std::process::exit(ExitCode::Error as i32);
        }
        None => {
            if let Some(terminal) = &terminal {
                if let Err(e) = terminal.restore() {
                    tracing::debug!(error = %e, "Failed to restore terminal mode");
                }
            }
            eprintln!("\n\nCancelled.");
            // A prompt may still be blocked on stdin; don't wait for it.
            std::process::exit(ExitCode::Success as i32);
        }
    }
}

/// The message printed for a failed run, with every cause in the chain.
fn error_report(err: &anyhow::Error) -> String {
    format!("Error: {err:#}")
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Api(args)) => api::run(args, cli).await,
        Some(Commands::Browser(args)) => browser::run(args, cli).await,
        Some(Commands::Config(args)) => config::run(args, cli),
        None => api::run(&RunArgs::from_env(), cli).await,
    }
}

// ============================================================================
// Tests
// ============================================================================
