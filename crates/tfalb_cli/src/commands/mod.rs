//! CLI command definitions.
//!
//! Each subcommand maps to one step of the deployment workflow; running the
//! binary without a subcommand performs an interactive `deploy`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use tfalb_templates::{AmiChoice, DeploymentParameters, InstanceType, ACCEPTED_REGION};

use crate::config::TfalbConfig;
use crate::prompt;

pub mod deploy;
pub mod destroy;
pub mod render;
pub mod validate;

/// tfalb - deploy an EC2 instance behind an Application Load Balancer
#[derive(Parser)]
#[command(name = "tfalb")]
#[command(version, about = "Deploy an EC2 instance behind an ALB with Terraform and validate it")]
#[command(long_about = r#"
tfalb renders a Terraform configuration for a single EC2 instance behind an
Application Load Balancer, runs the Terraform lifecycle and checks the result
against the AWS API.

WORKFLOWS:
  deploy    → Prompt for parameters, render, apply and validate (default)
  validate  → Validate resources from a previous apply
  destroy   → Destroy resources from a previous apply
  render    → Render the configuration only

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or input
  4 - Template error
  5 - Terraform error
  6 - Output file error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./tfalb.yaml when present)
    #[arg(short, long, global = true, env = "TFALB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log Terraform commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render, apply and validate (interactive unless all parameters are given)
    Deploy(deploy::DeployArgs),

    /// Validate resources from a previous apply and write the record
    Validate(validate::ValidateArgs),

    /// Destroy resources from a previous apply
    Destroy(destroy::DestroyArgs),

    /// Render the Terraform configuration without applying it
    Render(render::RenderArgs),
}

/// Deployment parameters; anything missing is prompted for.
#[derive(Args, Debug, Default, Clone)]
pub struct ParameterArgs {
    /// Machine image: ubuntu or amazon_linux
    #[arg(long)]
    pub ami: Option<String>,

    /// Instance type: t3.small or t3.medium
    #[arg(long)]
    pub instance_type: Option<String>,

    /// AWS region (only us-east-2 is supported; others are replaced)
    #[arg(long)]
    pub region: Option<String>,

    /// Application Load Balancer name
    #[arg(long)]
    pub alb_name: Option<String>,
}

impl ParameterArgs {
    /// True when every required parameter was given on the command line.
    pub fn is_complete(&self) -> bool {
        self.ami.is_some() && self.instance_type.is_some() && self.alb_name.is_some()
    }

    /// Resolve parameters, prompting for whatever is missing.
    pub fn resolve(&self, config: &TfalbConfig) -> Result<DeploymentParameters> {
        let interactive = !self.is_complete();

        let ami = match &self.ami {
            Some(raw) => prompt::choice_or_default::<AmiChoice>(raw),
            None => prompt::select_ami()?,
        };
        let instance_type = match &self.instance_type {
            Some(raw) => prompt::choice_or_default::<InstanceType>(raw),
            None => prompt::select_instance_type()?,
        };
        let region = match &self.region {
            Some(region) => region.clone(),
            None if interactive => prompt::input_region()?,
            None => ACCEPTED_REGION.to_string(),
        };
        let alb_name = match &self.alb_name {
            Some(name) => name.clone(),
            None => prompt::input_alb_name()?,
        };

        let params = DeploymentParameters::builder(ami, instance_type, alb_name)
            .region(region)
            .environment(&config.environment)
            .owner(&config.owner)
            .build()?;

        if let Some(rejected) = &params.region_choice().coerced_from {
            println!(
                "⚠️  Region '{}' is not supported, deploying to {}",
                rejected,
                params.region()
            );
        }
        Ok(params)
    }
}
