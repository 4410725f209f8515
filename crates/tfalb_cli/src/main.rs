//! tfalb CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or input
//! - 4: Template error
//! - 5: Terraform error
//! - 6: Output file error

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tfalb_iac::IacError;
use tfalb_templates::{InputError, TemplateError};
use tfalb_validate::ValidateError;

mod commands;
mod config;
mod context;
mod prompt;

use commands::{Cli, Commands};
use config::{ConfigError, TfalbConfig};
use context::AppContext;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const IAC_ERROR: u8 = 5;
    pub const OUTPUT_ERROR: u8 = 6;
}

fn init_logging(verbose: bool) {
    // Prefix match: covers every tfalb_* crate
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tfalb={},warn", level)));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = TfalbConfig::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config, cli.dry_run, cli.verbose);

    match cli.command {
        None => {
            let args = commands::deploy::DeployArgs {
                output: std::env::var_os("TFALB_OUTPUT").map(PathBuf::from),
                ..Default::default()
            };
            commands::deploy::execute(&ctx, args).await
        }
        Some(Commands::Deploy(args)) => commands::deploy::execute(&ctx, args).await,
        Some(Commands::Validate(args)) => commands::validate::execute(&ctx, args).await,
        Some(Commands::Destroy(args)) => commands::destroy::execute(&ctx, args).await,
        Some(Commands::Render(args)) => commands::render::execute(&ctx, args).await,
    }
}

/// Map the root cause of an error to an exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.is::<InputError>() || cause.is::<ConfigError>() {
            return ExitCodes::INVALID_ARGS;
        }
        if cause.is::<TemplateError>() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if let Some(iac) = cause.downcast_ref::<IacError>() {
            return match iac {
                IacError::Template(_) => ExitCodes::TEMPLATE_ERROR,
                _ => ExitCodes::IAC_ERROR,
            };
        }
        if cause.is::<ValidateError>() {
            return ExitCodes::OUTPUT_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}
