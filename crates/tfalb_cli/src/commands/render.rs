//! Render command - Write the Terraform configuration without applying it.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tfalb_templates::{
    DeploymentParameters, RenderedConfiguration, TemplateLoader, TemplateRenderer,
};

use crate::config::TfalbConfig;
use crate::context::AppContext;

use super::ParameterArgs;

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub params: ParameterArgs,

    /// Print the rendered configuration instead of writing it
    #[arg(long)]
    pub stdout: bool,
}

/// Load the configured template and substitute `params` into it.
pub fn render_configuration(
    config: &TfalbConfig,
    params: &DeploymentParameters,
) -> Result<RenderedConfiguration> {
    let loader = TemplateLoader::new(&config.templates_dir);
    let template = loader
        .load(&config.template_file)
        .context("Failed to load Terraform template")?;

    let rendered = TemplateRenderer::new()
        .render(params, &template)
        .with_context(|| format!("Failed to render template {}", template.name()))?;
    Ok(rendered)
}

pub async fn execute(ctx: &AppContext, args: RenderArgs) -> Result<()> {
    let params = args.params.resolve(&ctx.config)?;
    let rendered = render_configuration(&ctx.config, &params)?;

    if args.stdout {
        print!("{}", rendered.as_str());
        return Ok(());
    }

    let path = TemplateRenderer::write_configuration(&rendered, &ctx.config.generated_dir)
        .context("Failed to write Terraform configuration")?;
    info!("Rendered configuration for {}", params.alb_name());
    println!("📄 Terraform configuration written to {}", path.display());
    Ok(())
}
