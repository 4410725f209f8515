//! Destroy command - Tear down resources from a previous apply.

use anyhow::{Context, Result};
use clap::Args;

use tfalb_templates::{ACCEPTED_REGION, CONFIGURATION_FILE};

use crate::context::AppContext;
use crate::prompt;

#[derive(Args)]
pub struct DestroyArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn execute(ctx: &AppContext, args: DestroyArgs) -> Result<()> {
    let dir = &ctx.config.generated_dir;
    if !dir.join(CONFIGURATION_FILE).exists() {
        anyhow::bail!("No generated configuration found in {}", dir.display());
    }

    if !args.yes
        && !ctx.dry_run
        && !prompt::confirm("Destroy the instance and load balancer managed in this directory?")?
    {
        println!("Aborted");
        return Ok(());
    }

    ctx.provisioner(ACCEPTED_REGION)
        .destroy()
        .await
        .context("Failed to destroy resources")?;

    println!("🗑️  All resources destroyed");
    Ok(())
}
