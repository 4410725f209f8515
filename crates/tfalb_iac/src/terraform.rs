//! Terraform CLI commands.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tfalb_runner::{CommandRunner, CommandSpec, RunConfig, RunnerError};

use crate::error::IacResult;

/// Plan file written by `plan` and consumed by `show` / `apply`.
pub const PLAN_FILE: &str = "tfplan";

/// A step of the Terraform lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerraformStep {
    Init,
    Plan,
    Show,
    Apply,
    Output,
    Destroy,
}

impl TerraformStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerraformStep::Init => "init",
            TerraformStep::Plan => "plan",
            TerraformStep::Show => "show",
            TerraformStep::Apply => "apply",
            TerraformStep::Output => "output",
            TerraformStep::Destroy => "destroy",
        }
    }
}

impl fmt::Display for TerraformStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deadline for each lifecycle step, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepTimeouts {
    pub init_secs: u64,
    pub plan_secs: u64,
    pub show_secs: u64,
    pub apply_secs: u64,
    pub output_secs: u64,
    pub destroy_secs: u64,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            init_secs: 60,
            plan_secs: 120,
            show_secs: 30,
            apply_secs: 600,
            output_secs: 30,
            destroy_secs: 600,
        }
    }
}

impl StepTimeouts {
    pub fn for_step(&self, step: TerraformStep) -> u64 {
        match step {
            TerraformStep::Init => self.init_secs,
            TerraformStep::Plan => self.plan_secs,
            TerraformStep::Show => self.show_secs,
            TerraformStep::Apply => self.apply_secs,
            TerraformStep::Output => self.output_secs,
            TerraformStep::Destroy => self.destroy_secs,
        }
    }
}

/// Result of a Terraform command.
#[derive(Debug, Clone)]
pub struct TerraformResult {
    pub step: TerraformStep,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
    pub timed_out: bool,
}

/// Runs Terraform subcommands in a working directory.
pub struct TerraformRunner {
    runner: Arc<dyn CommandRunner>,
    program: String,
    working_dir: PathBuf,
    env: Vec<(String, String)>,
    timeouts: StepTimeouts,
    stream_logs: bool,
}

impl TerraformRunner {
    /// Create a new Terraform runner.
    pub fn new(runner: Arc<dyn CommandRunner>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: "terraform".to_string(),
            working_dir: working_dir.into(),
            env: vec![("TF_IN_AUTOMATION".to_string(), "1".to_string())],
            timeouts: StepTimeouts::default(),
            stream_logs: false,
        }
    }

    /// Use a different Terraform binary (e.g. `tofu` or an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: StepTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_stream_logs(mut self, enabled: bool) -> Self {
        self.stream_logs = enabled;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Check that the Terraform binary can be launched.
    pub async fn is_available(&self) -> IacResult<bool> {
        Ok(self.runner.is_available(&self.program).await?)
    }

    /// Run terraform init.
    pub async fn init(&self) -> IacResult<TerraformResult> {
        info!("Initializing Terraform in {:?}", self.working_dir);
        self.run_command(TerraformStep::Init, &["init", "-input=false", "-no-color"])
            .await
    }

    /// Run terraform plan, saving the plan file.
    pub async fn plan(&self) -> IacResult<TerraformResult> {
        info!("Planning Terraform changes");
        let out = format!("-out={}", PLAN_FILE);
        self.run_command(
            TerraformStep::Plan,
            &["plan", "-input=false", "-no-color", &out],
        )
        .await
    }

    /// Show the saved plan.
    pub async fn show(&self) -> IacResult<TerraformResult> {
        info!("Showing detailed plan");
        self.run_command(TerraformStep::Show, &["show", "-no-color", PLAN_FILE])
            .await
    }

    /// Apply the saved plan.
    pub async fn apply(&self) -> IacResult<TerraformResult> {
        info!("Applying Terraform changes, this might take a few minutes");
        self.run_command(
            TerraformStep::Apply,
            &["apply", "-input=false", "-no-color", "-auto-approve", PLAN_FILE],
        )
        .await
    }

    /// Read root module outputs as JSON.
    pub async fn output_json(&self) -> IacResult<TerraformResult> {
        debug!("Reading Terraform outputs");
        self.run_command(TerraformStep::Output, &["output", "-no-color", "-json"])
            .await
    }

    /// Destroy all resources managed by the working directory.
    pub async fn destroy(&self) -> IacResult<TerraformResult> {
        info!("Destroying Terraform-managed resources");
        self.run_command(
            TerraformStep::Destroy,
            &["destroy", "-input=false", "-no-color", "-auto-approve"],
        )
        .await
    }

    /// Run one Terraform subcommand. A deadline overrun is reported as a failed result.
    async fn run_command(&self, step: TerraformStep, args: &[&str]) -> IacResult<TerraformResult> {
        let mut spec = CommandSpec::new(&self.program)
            .args(args.iter().copied())
            .workdir(&self.working_dir);
        for (key, value) in &self.env {
            spec = spec.env(key, value);
        }

        let timeout = self.timeouts.for_step(step);
        let run_config = RunConfig::default()
            .timeout(timeout)
            .stream_logs(self.stream_logs);

        debug!("Executing terraform {:?}", args);

        match self.runner.run(&spec, &run_config).await {
            Ok(result) => Ok(TerraformResult {
                step,
                success: result.success(),
                stdout: result.stdout,
                stderr: result.stderr,
                exit_code: result.exit_code,
                timed_out: false,
            }),
            Err(RunnerError::Timeout(secs)) => {
                warn!("terraform {} timed out after {}s", step, secs);
                Ok(TerraformResult {
                    step,
                    success: false,
                    stdout: String::new(),
                    stderr: format!("terraform {} timed out after {} seconds", step, secs),
                    exit_code: -1,
                    timed_out: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
