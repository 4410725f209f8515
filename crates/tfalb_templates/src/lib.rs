//! # tfalb_templates
//!
//! Deployment parameters and Terraform template rendering for tfalb.
//!
//! This crate turns a handful of user choices into a complete Terraform
//! configuration:
//!
//! - Fixed lookup tables from human readable AMI / instance type choices
//!   to provider identifiers
//! - Region policy (a single accepted region, everything else is coerced)
//! - Load balancer name validation
//! - `{{ placeholder }}` rendering with strict missing-variable detection
//! - Atomic persistence of the rendered configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use tfalb_templates::{AmiChoice, DeploymentParameters, InstanceType, TemplateLoader, TemplateRenderer};
//! use std::path::Path;
//!
//! let params = DeploymentParameters::builder(AmiChoice::Ubuntu, InstanceType::T3Small, "my-alb")
//!     .region("us-east-2")
//!     .build()
//!     .unwrap();
//!
//! let template = TemplateLoader::new("templates").load("main.tf.tpl").unwrap();
//! let rendered = TemplateRenderer::new().render(&params, &template).unwrap();
//! TemplateRenderer::write_configuration(&rendered, Path::new("generated")).unwrap();
//! ```

pub mod error;
pub mod loader;
pub mod params;
pub mod renderer;

pub use error::{InputError, InputResult, TemplateError, TemplateResult};
pub use loader::TemplateLoader;
pub use params::{
    validate_load_balancer_name, AmiChoice, DeploymentParameters, InstanceType, ParametersBuilder,
    RegionChoice, ACCEPTED_REGION,
};
pub use renderer::{RenderedConfiguration, Template, TemplateRenderer, CONFIGURATION_FILE};
