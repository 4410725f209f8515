//! # tfalb_iac
//!
//! Terraform lifecycle orchestration for tfalb.
//!
//! The provisioner is treated as a black box: this crate writes the rendered
//! configuration, drives `init`, `plan` and `apply` in order, observes exit
//! codes and captured output, and reads `terraform output -json` to learn the
//! identifiers of what was created. Terraform's own state files are never read.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tfalb_iac::{ProvisionerEnv, TerraformProvisioner};
//! use tfalb_runner::{HostRunner, HostRunnerOptions};
//!
//! # async fn run(configuration: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = Arc::new(HostRunner::new(HostRunnerOptions::default()));
//! let provisioner = TerraformProvisioner::new(runner, "generated")
//!     .with_env(ProvisionerEnv::new("us-east-2"))
//!     .with_load_balancer_name("my-alb");
//!
//! let result = provisioner.apply(configuration).await?;
//! let ids = result.into_resource_ids()?;
//! println!("instance {}", ids.instance_id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod outputs;
pub mod provisioner;
pub mod terraform;

pub use error::{IacError, IacResult};
pub use outputs::{ResourceIdentifierSet, TerraformOutputs};
pub use provisioner::{ProvisionResult, ProvisionerEnv, TerraformProvisioner};
pub use terraform::{StepTimeouts, TerraformResult, TerraformRunner, TerraformStep};
