//! Validate command - Check resources from a previous apply.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tfalb_templates::ACCEPTED_REGION;
use tfalb_validate::ResultWriter;

use crate::context::AppContext;

#[derive(Args)]
pub struct ValidateArgs {
    /// Load balancer name, used when the Terraform outputs do not include it
    #[arg(long)]
    pub alb_name: Option<String>,

    /// Where to write the validation record
    #[arg(short, long, env = "TFALB_OUTPUT")]
    pub output: Option<PathBuf>,
}

pub async fn execute(ctx: &AppContext, args: ValidateArgs) -> Result<()> {
    let mut provisioner = ctx.provisioner(ACCEPTED_REGION);
    if let Some(name) = args.alb_name {
        provisioner = provisioner.with_load_balancer_name(name);
    }

    let ids = provisioner
        .resource_ids()
        .await
        .context("Failed to read resource identifiers from Terraform outputs")?;

    let record = ctx.validator(ACCEPTED_REGION).await.validate(&ids).await;

    let output = ctx.output_path(args.output);
    ResultWriter::write(&record, &output)?;

    println!("{}", ResultWriter::to_json(&record)?.trim_end());
    println!("✅ Results written to {}", output.display());
    Ok(())
}
