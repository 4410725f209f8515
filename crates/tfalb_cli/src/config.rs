//! Configuration file support.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use tfalb_iac::StepTimeouts;
use tfalb_templates::{DEFAULT_ENVIRONMENT, DEFAULT_OWNER};
use tfalb_validate::DEFAULT_OUTPUT_FILE;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tfalb.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Deadlines for Terraform steps and cloud API calls, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    #[serde(flatten)]
    pub steps: StepTimeouts,
    pub api_call_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            steps: StepTimeouts::default(),
            api_call_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn api_call(&self) -> Duration {
        Duration::from_secs(self.api_call_secs)
    }
}

/// tfalb settings, read from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfalbConfig {
    pub templates_dir: PathBuf,
    pub template_file: String,
    pub generated_dir: PathBuf,
    pub output_path: PathBuf,
    pub environment: String,
    pub owner: String,
    /// Named AWS profile; the default credential chain is used when unset
    pub aws_profile: Option<String>,
    /// Terraform binary
    pub terraform_bin: String,
    pub timeouts: TimeoutConfig,
}

impl Default for TfalbConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            template_file: "main.tf.tpl".to_string(),
            generated_dir: PathBuf::from("generated"),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            aws_profile: None,
            terraform_bin: "terraform".to_string(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl TfalbConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, `tfalb.yaml`
    /// in the working directory is used if present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}
