//! Command configuration types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A host command to execute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to launch (resolved through `PATH`)
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory
    pub workdir: Option<PathBuf>,
    /// Environment variables added on top of the inherited environment
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Render the command line for logging. Environment values are not included.
    pub fn display(&self) -> String {
        let mut cmd = self.program.clone();
        for arg in &self.args {
            if arg.contains(' ') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }
}

/// Run configuration with deadline and streaming options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
    /// Whether to stream output lines to the log while running
    pub stream_logs: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 300, // 5 minutes
            stream_logs: false,
        }
    }
}

impl RunConfig {
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn stream(mut self) -> Self {
        self.stream_logs = true;
        self
    }

    /// Enable or disable log streaming.
    pub fn stream_logs(mut self, enabled: bool) -> Self {
        self.stream_logs = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("terraform")
            .args(["plan", "-out=tfplan"])
            .workdir("/tmp/generated")
            .env("AWS_REGION", "us-east-2");

        assert_eq!(spec.args, vec!["plan", "-out=tfplan"]);
        assert_eq!(spec.workdir, Some(PathBuf::from("/tmp/generated")));
        assert_eq!(spec.env.get("AWS_REGION"), Some(&"us-east-2".to_string()));
    }

    #[test]
    fn test_display_hides_env() {
        let spec = CommandSpec::new("terraform")
            .arg("apply")
            .arg("two words")
            .env("AWS_PROFILE", "secret-profile");

        assert_eq!(spec.display(), "terraform apply 'two words'");
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.timeout_seconds, 300);
        assert!(!config.stream_logs);
        assert!(RunConfig::default().timeout(60).stream().stream_logs);
    }
}
