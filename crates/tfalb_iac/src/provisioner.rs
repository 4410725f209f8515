//! External provisioner invocation.
//!
//! Writes the configuration, then runs `init` → `plan` → `apply` and stops at
//! the first non-zero exit. Repeated applies against an already applied
//! configuration are left to Terraform.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use tfalb_runner::CommandRunner;
use tfalb_templates::TemplateRenderer;

use crate::error::{IacError, IacResult};
use crate::outputs::{ResourceIdentifierSet, TerraformOutputs};
use crate::terraform::{StepTimeouts, TerraformResult, TerraformRunner, TerraformStep};

/// Provider settings handed to every Terraform step.
///
/// Credentials themselves stay in the provider chain (environment or shared
/// credentials file); only the region and an optional named profile are passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerEnv {
    pub region: String,
    pub profile: Option<String>,
}

impl ProvisionerEnv {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }
}

/// Outcome of a provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionResult {
    pub success: bool,
    pub resource_ids: Option<ResourceIdentifierSet>,
    /// Captured stderr of the failed step, verbatim.
    pub error_output: Option<String>,
    pub failed_step: Option<TerraformStep>,
    pub outputs: TerraformOutputs,
}

impl ProvisionResult {
    fn failed(result: TerraformResult) -> Self {
        let output = if result.stderr.trim().is_empty() {
            result.stdout
        } else {
            result.stderr
        };
        error!("terraform {} failed:\n{}", result.step, output);

        Self {
            success: false,
            resource_ids: None,
            error_output: Some(output),
            failed_step: Some(result.step),
            outputs: TerraformOutputs::default(),
        }
    }

    /// Resource identifiers of a successful run, or the error that prevents having them.
    pub fn into_resource_ids(self) -> IacResult<ResourceIdentifierSet> {
        if !self.success {
            return Err(IacError::StepFailed {
                step: self.failed_step.unwrap_or(TerraformStep::Apply),
                stderr: self.error_output.unwrap_or_default(),
            });
        }
        match self.resource_ids {
            Some(ids) => Ok(ids),
            // Re-derive without a fallback to report which output is missing
            None => ResourceIdentifierSet::from_outputs(&self.outputs, None),
        }
    }
}

/// Drives the Terraform lifecycle for one generated configuration directory.
pub struct TerraformProvisioner {
    terraform: TerraformRunner,
    working_dir: PathBuf,
    load_balancer_name: Option<String>,
}

impl TerraformProvisioner {
    pub fn new(runner: Arc<dyn CommandRunner>, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            terraform: TerraformRunner::new(runner, working_dir.clone()),
            working_dir,
            load_balancer_name: None,
        }
    }

    pub fn with_env(mut self, env: ProvisionerEnv) -> Self {
        self.terraform = self.terraform.with_env("AWS_REGION", env.region);
        if let Some(profile) = env.profile {
            self.terraform = self.terraform.with_env("AWS_PROFILE", profile);
        }
        self
    }

    pub fn with_timeouts(mut self, timeouts: StepTimeouts) -> Self {
        self.terraform = self.terraform.with_timeouts(timeouts);
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.terraform = self.terraform.with_program(program);
        self
    }

    pub fn with_stream_logs(mut self, enabled: bool) -> Self {
        self.terraform = self.terraform.with_stream_logs(enabled);
        self
    }

    /// Name the configuration gives the load balancer, used when outputs omit it.
    pub fn with_load_balancer_name(mut self, name: impl Into<String>) -> Self {
        self.load_balancer_name = Some(name.into());
        self
    }

    async fn ensure_available(&self) -> IacResult<()> {
        if !self.terraform.is_available().await? {
            return Err(IacError::TerraformNotAvailable(
                "Terraform is not installed or not in PATH. Please install Terraform and try again."
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Write `configuration_text` and run init, plan and apply.
    ///
    /// A failing step is reported in the returned [`ProvisionResult`]; only
    /// problems running Terraform at all (not installed, cannot spawn, cannot
    /// write the configuration) are returned as errors.
    pub async fn apply(&self, configuration_text: &str) -> IacResult<ProvisionResult> {
        self.ensure_available().await?;

        let path = TemplateRenderer::write_configuration_text(configuration_text, &self.working_dir)?;
        info!("Working directory: {:?}", self.working_dir);
        debug!("Configuration written to {:?}", path);

        let init = self.terraform.init().await?;
        if !init.success {
            return Ok(ProvisionResult::failed(init));
        }

        let plan = self.terraform.plan().await?;
        if !plan.success {
            return Ok(ProvisionResult::failed(plan));
        }

        if plan.stdout.contains("No changes") {
            info!("No changes. Infrastructure matches the configuration");
        } else {
            let show = self.terraform.show().await?;
            if !show.success {
                return Ok(ProvisionResult::failed(show));
            }
            debug!("Plan:\n{}", show.stdout);
        }

        let apply = self.terraform.apply().await?;
        if !apply.success {
            return Ok(ProvisionResult::failed(apply));
        }
        info!("✨ Deployment completed successfully");

        let outputs = match self.read_outputs().await {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!("Could not read Terraform outputs: {}", e);
                TerraformOutputs::default()
            }
        };

        let resource_ids =
            match ResourceIdentifierSet::from_outputs(&outputs, self.load_balancer_name.as_deref())
            {
                Ok(ids) => Some(ids),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            };

        Ok(ProvisionResult {
            success: true,
            resource_ids,
            error_output: None,
            failed_step: None,
            outputs,
        })
    }

    /// Read outputs of the last apply in the working directory.
    pub async fn read_outputs(&self) -> IacResult<TerraformOutputs> {
        let result = self.terraform.output_json().await?;
        if !result.success {
            return Err(IacError::StepFailed {
                step: TerraformStep::Output,
                stderr: result.stderr,
            });
        }
        TerraformOutputs::parse(&result.stdout)
    }

    /// Identifiers of the resources from the last apply.
    pub async fn resource_ids(&self) -> IacResult<ResourceIdentifierSet> {
        self.ensure_available().await?;
        let outputs = self.read_outputs().await?;
        ResourceIdentifierSet::from_outputs(&outputs, self.load_balancer_name.as_deref())
    }

    /// Destroy everything the working directory manages.
    pub async fn destroy(&self) -> IacResult<()> {
        self.ensure_available().await?;

        let result = self.terraform.destroy().await?;
        if !result.success {
            error!("Terraform destroy failed");
            return Err(IacError::StepFailed {
                step: TerraformStep::Destroy,
                stderr: result.stderr,
            });
        }
        info!("All resources destroyed successfully");
        Ok(())
    }
}
