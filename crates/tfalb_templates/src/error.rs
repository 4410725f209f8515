//! Error types for templates and deployment parameters.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Result type alias for parameter validation.
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur while loading, rendering or persisting a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(PathBuf),

    #[error("Template parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Template variable not provided: {0}")]
    MissingVariable(String),

    #[error("IO error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating user supplied deployment parameters.
///
/// These are recoverable: the interactive layer re-prompts or falls back to a default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid load balancer name '{name}': {reason}")]
    InvalidLoadBalancerName { name: String, reason: String },

    #[error("Unknown AMI choice: {0}")]
    UnknownAmi(String),

    #[error("Unknown instance type: {0}")]
    UnknownInstanceType(String),
}
