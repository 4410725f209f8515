//! # tfalb_runner
//!
//! Host process execution wrapper for tfalb.
//!
//! Every external tool the deployment drives (the Terraform CLI) is executed
//! through the [`CommandRunner`] trait, so the provisioning layer can be
//! tested without spawning anything.
//!
//! # Features
//!
//! - **Bounded waits**: every command carries a deadline; the child is killed when it passes
//! - **Streaming capture**: stdout and stderr are drained concurrently and kept verbatim
//! - **Progress events**: resource create/modify lines are surfaced as log events
//! - **Dry-Run Mode**: log commands without executing them
//! - **Mock Runner**: scripted responses and call capture for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use tfalb_runner::{CommandRunner, CommandSpec, HostRunner, HostRunnerOptions, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = HostRunner::new(HostRunnerOptions::default());
//!
//!     let spec = CommandSpec::new("terraform").arg("version").workdir("generated");
//!     let result = runner.run(&spec, &RunConfig::default().timeout(30)).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod mock;
pub mod runner;

pub use config::{CommandSpec, RunConfig};
pub use error::{RunnerError, RunnerResult};
pub use host::{HostRunner, HostRunnerOptions, LogHandler, LogLine, LogStream, ProgressEvent};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{CommandRunner, ExecutionResult};
