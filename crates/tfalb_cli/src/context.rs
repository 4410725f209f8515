//! Collaborators shared by the commands.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use tfalb_iac::{ProvisionerEnv, TerraformProvisioner};
use tfalb_runner::{CommandRunner, HostRunner, HostRunnerOptions};
use tfalb_validate::{AwsInspector, AwsSettings, CloudInspector, DeploymentValidator};

use crate::config::TfalbConfig;

/// Configuration plus the process runner and cloud inspector the commands use.
pub struct AppContext {
    pub config: TfalbConfig,
    pub dry_run: bool,
    pub verbose: bool,
    runner: Arc<dyn CommandRunner>,
    inspector: Option<Arc<dyn CloudInspector>>,
}

impl AppContext {
    pub fn new(config: TfalbConfig, dry_run: bool, verbose: bool) -> Self {
        let mut options = HostRunnerOptions::new();
        if dry_run {
            options = options.dry_run();
        }
        Self {
            config,
            dry_run,
            verbose,
            runner: Arc::new(HostRunner::new(options)),
            inspector: None,
        }
    }

    /// Replace the process runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Use a fixed inspector instead of connecting to AWS.
    pub fn with_inspector(mut self, inspector: Arc<dyn CloudInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    pub fn provisioner(&self, region: &str) -> TerraformProvisioner {
        let env = ProvisionerEnv::new(region).with_profile(self.config.aws_profile.clone());
        TerraformProvisioner::new(self.runner.clone(), &self.config.generated_dir)
            .with_env(env)
            .with_program(&self.config.terraform_bin)
            .with_timeouts(self.config.timeouts.steps.clone())
            .with_stream_logs(self.verbose)
    }

    pub async fn validator(&self, region: &str) -> DeploymentValidator {
        let inspector = match &self.inspector {
            Some(inspector) => inspector.clone(),
            None => {
                let settings =
                    AwsSettings::new(region).with_profile(self.config.aws_profile.clone());
                let inspector = AwsInspector::connect(&settings).await;
                debug!("Connected to AWS: {:?}", inspector);
                Arc::new(inspector)
            }
        };
        DeploymentValidator::new(inspector).with_call_timeout(self.config.timeouts.api_call())
    }

    pub fn output_path(&self, requested: Option<PathBuf>) -> PathBuf {
        requested.unwrap_or_else(|| self.config.output_path.clone())
    }
}
