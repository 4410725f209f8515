//! # tfalb_validate
//!
//! Post-deploy validation for tfalb.
//!
//! After a successful apply the validator asks the cloud provider whether the
//! expected compute instance and load balancer exist, and assembles a
//! [`ValidationRecord`]. Each lookup is independent: a resource that cannot be
//! resolved (missing, not yet visible, API error, deadline passed) turns into
//! an `unknown` / absent field instead of failing the whole pass.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tfalb_iac::ResourceIdentifierSet;
//! use tfalb_validate::{AwsInspector, AwsSettings, DeploymentValidator, ResultWriter};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let inspector = AwsInspector::connect(&AwsSettings::new("us-east-2")).await;
//! let validator = DeploymentValidator::new(Arc::new(inspector));
//!
//! let ids = ResourceIdentifierSet::new("i-0abc12345def67890", "my-alb");
//! let record = validator.validate(&ids).await;
//! ResultWriter::write(&record, Path::new("aws_validation.json"))?;
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod error;
pub mod inspector;
pub mod record;
pub mod validator;
pub mod writer;

pub use aws::{AwsInspector, AwsSettings};
pub use error::{LookupError, LookupResult, ValidateError, ValidateResult};
pub use inspector::{CloudInspector, InstanceInfo, LoadBalancerInfo};
pub use record::{InstanceState, ValidationRecord};
pub use validator::{DeploymentValidator, DEFAULT_CALL_TIMEOUT};
pub use writer::{ResultWriter, DEFAULT_OUTPUT_FILE};
