//! Error types for IaC module.

use thiserror::Error;

use crate::terraform::TerraformStep;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur during IaC operations.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Terraform not available: {0}")]
    TerraformNotAvailable(String),

    #[error("Terraform {step} failed:\n{stderr}")]
    StepFailed { step: TerraformStep, stderr: String },

    #[error("Terraform output is missing `{0}`")]
    MissingOutput(String),

    #[error("Invalid Terraform output: {0}")]
    InvalidOutput(String),

    #[error("Runner error: {0}")]
    Runner(#[from] tfalb_runner::RunnerError),

    #[error("Template error: {0}")]
    Template(#[from] tfalb_templates::TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
