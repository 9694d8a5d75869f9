//! Config command - manage configuration.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use stallmap_store::{default_config_dir, Config};
use std::path::PathBuf;
use tracing::info;

use super::access::load_config;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a config file with the defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(*force, cli),
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match cli.format {
        OutputFormat::Text => {
            println!("StallMap Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Backend URL:     {}", config.backend_url);
            println!("Frontend URL:    {}", config.frontend_url);
            println!("Output file:     {}", config.output_path.display());
            println!("Request timeout: {}s", config.request_timeout_secs);
            println!();
            println!("Browser:");
            println!("  Headless:           {}", config.browser.headless);
            println!(
                "  Navigation timeout: {}s",
                config.browser.navigation_timeout_secs
            );
            match &config.browser.chrome_path {
                Some(path) => println!("  Chromium:           {}", path.display()),
                None => println!("  Chromium:           (search PATH)"),
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = config_path(cli);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = config_path(cli);

    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(&path)?;

    info!(path = %path.display(), "Config initialized");
    if !cli.quiet {
        println!("Wrote default configuration to {}", path.display());
    }

    Ok(())
}
