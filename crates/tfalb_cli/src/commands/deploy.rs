//! Deploy command - Render, apply and validate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tfalb_templates::DeploymentParameters;
use tfalb_validate::{ResultWriter, ValidationRecord};

use crate::context::AppContext;

use super::render::render_configuration;
use super::ParameterArgs;

#[derive(Args, Default)]
pub struct DeployArgs {
    #[command(flatten)]
    pub params: ParameterArgs,

    /// Where to write the validation record
    #[arg(short, long, env = "TFALB_OUTPUT")]
    pub output: Option<PathBuf>,
}

pub async fn execute(ctx: &AppContext, args: DeployArgs) -> Result<()> {
    println!("🚀 EC2 + ALB deployment\n");

    let params = args.params.resolve(&ctx.config)?;
    let output = ctx.output_path(args.output);

    match deploy(ctx, &params, &output).await? {
        Some(record) => print_summary(&record, &output),
        None => println!("🔍 Dry run complete, nothing was deployed"),
    }
    Ok(())
}

/// Run the whole pipeline for resolved parameters.
///
/// Returns `None` in dry-run mode, where nothing is applied or validated.
/// Nothing is written to `output` unless the apply succeeded.
pub async fn deploy(
    ctx: &AppContext,
    params: &DeploymentParameters,
    output: &Path,
) -> Result<Option<ValidationRecord>> {
    let rendered = render_configuration(&ctx.config, params)?;

    let provisioner = ctx
        .provisioner(params.region())
        .with_load_balancer_name(params.alb_name());

    let result = provisioner
        .apply(rendered.as_str())
        .await
        .context("Failed to run Terraform")?;

    if ctx.dry_run {
        info!("Dry run: skipping validation");
        return Ok(None);
    }

    let ids = result.into_resource_ids()?;
    info!(
        "Deployed instance {} behind load balancer {}",
        ids.instance_id, ids.load_balancer_name
    );

    let record = ctx.validator(params.region()).await.validate(&ids).await;
    ResultWriter::write(&record, output)?;
    Ok(Some(record))
}

fn print_summary(record: &ValidationRecord, output: &Path) {
    println!("\n📋 Validation summary");
    println!("   Instance:      {}", record.instance_id);
    println!("   State:         {}", record.instance_state);
    println!(
        "   Public IP:     {}",
        record.public_ip.as_deref().unwrap_or("-")
    );
    println!(
        "   Load balancer: {}",
        record.load_balancer_dns.as_deref().unwrap_or("not found")
    );
    println!("\n✅ Results written to {}", output.display());
}
