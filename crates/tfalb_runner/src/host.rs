//! Host process runner.
//!
//! Spawns programs directly on the host with piped output, drains stdout and
//! stderr on reader threads and enforces a deadline by polling the child.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::{CommandSpec, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long output readers may outlive the child once it is gone.
const READER_GRACE: Duration = Duration::from_secs(2);

/// A line of output from a running command.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: chrono::DateTime<Utc>,
    pub stream: LogStream,
    pub message: String,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Resource progress reported by a provisioning tool's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    InProgress,
    Completed,
    Failed,
}

impl ProgressEvent {
    /// Classify an output line, if it reports resource progress.
    pub fn classify(stream: LogStream, line: &str) -> Option<Self> {
        match stream {
            LogStream::Stdout => {
                if line.contains("Creating...") || line.contains("Modifying...") {
                    Some(Self::InProgress)
                } else if line.contains("Creation complete")
                    || line.contains("Modifications complete")
                {
                    Some(Self::Completed)
                } else {
                    None
                }
            }
            LogStream::Stderr => line.contains("Error:").then_some(Self::Failed),
        }
    }
}

/// Log handler callback type.
pub type LogHandler = Arc<dyn Fn(LogLine) + Send + Sync>;

/// Host runner options.
#[derive(Debug, Clone, Default)]
pub struct HostRunnerOptions {
    /// Dry-run mode (log commands without executing)
    pub dry_run: bool,
}

impl HostRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Runs commands as child processes of this one.
pub struct HostRunner {
    options: HostRunnerOptions,
    log_handler: Option<LogHandler>,
}

impl HostRunner {
    pub fn new(options: HostRunnerOptions) -> Self {
        Self {
            options,
            log_handler: None,
        }
    }

    /// Set a log handler for streamed lines.
    pub fn with_log_handler(mut self, handler: LogHandler) -> Self {
        self.log_handler = Some(handler);
        self
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn probe(program: &str) -> bool {
        Command::new(program)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Read a pipe to the end, emitting progress and optional log lines.
///
/// Lines are decoded lossily; invalid UTF-8 never stops the pipe from being drained.
fn drain<R: Read>(
    reader: R,
    stream: LogStream,
    stream_logs: bool,
    log_handler: Option<LogHandler>,
) -> String {
    let mut reader = BufReader::new(reader);
    let mut output = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Stopped reading {}: {}", stream, e);
                break;
            }
        }

        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw).into_owned();
        output.push_str(&line);
        output.push('\n');

        match ProgressEvent::classify(stream, &line) {
            Some(ProgressEvent::InProgress) => info!("⏳ {}", line.trim()),
            Some(ProgressEvent::Completed) => info!("✅ {}", line.trim()),
            Some(ProgressEvent::Failed) => error!("❌ {}", line.trim()),
            None if stream_logs => debug!("[{}] {}", stream, line),
            None => {}
        }

        if let Some(handler) = &log_handler {
            handler(LogLine {
                timestamp: Utc::now(),
                stream,
                message: line,
            });
        }
    }
    output
}

/// Wait for a reader thread until `deadline`.
///
/// A process the child left behind can hold the pipe open; its reader is
/// then abandoned and `None` returned.
fn join_reader(handle: JoinHandle<String>, deadline: Instant) -> Option<String> {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    handle.join().ok()
}

/// Spawn, capture and wait; runs on a blocking thread.
fn execute_blocking(
    spec: CommandSpec,
    run_config: RunConfig,
    log_handler: Option<LogHandler>,
) -> RunnerResult<(i64, String, String)> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &spec.workdir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|e| {
        RunnerError::ExecutionFailed(format!("Failed to spawn {}: {}", spec.program, e))
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

    let stdout_handle = std::thread::spawn({
        let handler = log_handler.clone();
        let stream_logs = run_config.stream_logs;
        move || drain(stdout, LogStream::Stdout, stream_logs, handler)
    });
    let stderr_handle = std::thread::spawn({
        let handler = log_handler;
        let stream_logs = run_config.stream_logs;
        move || drain(stderr, LogStream::Stderr, stream_logs, handler)
    });

    // Wait for completion with timeout
    let status = if run_config.timeout_seconds > 0 {
        let timeout = Duration::from_secs(run_config.timeout_seconds);
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > timeout {
                        warn!(
                            "Killing `{}` after {}s",
                            spec.display(),
                            run_config.timeout_seconds
                        );
                        let _ = child.kill();
                        let _ = child.wait();
                        let grace = Instant::now() + READER_GRACE;
                        let _ = join_reader(stdout_handle, grace);
                        let _ = join_reader(stderr_handle, grace);
                        return Err(RunnerError::Timeout(run_config.timeout_seconds));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(RunnerError::ExecutionFailed(format!(
                        "Failed to wait for process: {}",
                        e
                    )));
                }
            }
        }
    } else {
        child.wait().map_err(|e| {
            RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e))
        })?
    };

    let (stdout_output, stderr_output) = if run_config.timeout_seconds > 0 {
        let grace = Instant::now() + READER_GRACE;
        let stdout_output = join_reader(stdout_handle, grace);
        let stderr_output = join_reader(stderr_handle, grace);
        if stdout_output.is_none() || stderr_output.is_none() {
            warn!(
                "Output of `{}` still held open after exit, discarding the rest",
                spec.display()
            );
        }
        (
            stdout_output.unwrap_or_default(),
            stderr_output.unwrap_or_default(),
        )
    } else {
        (
            stdout_handle.join().unwrap_or_default(),
            stderr_handle.join().unwrap_or_default(),
        )
    };

    let exit_code = status.code().map(i64::from).unwrap_or(-1);

    Ok((exit_code, stdout_output, stderr_output))
}

#[async_trait]
impl CommandRunner for HostRunner {
    async fn is_available(&self, program: &str) -> RunnerResult<bool> {
        if self.options.dry_run {
            return Ok(true);
        }
        let program = program.to_string();
        tokio::task::spawn_blocking(move || Self::probe(&program))
            .await
            .map_err(|e| RunnerError::ExecutionFailed(e.to_string()))
    }

    async fn run(
        &self,
        spec: &CommandSpec,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let cmd_str = spec.display();

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", cmd_str);
            return Ok(ExecutionResult {
                exit_code: 0,
                stdout: format!("[DRY-RUN] Command: {}", cmd_str),
                stderr: String::new(),
                started_at: Utc::now(),
                finished_at: Utc::now(),
                duration_ms: 0,
            });
        }

        info!("Running command: {}", cmd_str);
        if let Some(dir) = &spec.workdir {
            debug!("Working directory: {:?}", dir);
        }

        let started_at = Utc::now();
        let (exit_code, stdout, stderr) = tokio::task::spawn_blocking({
            let spec = spec.clone();
            let run_config = run_config.clone();
            let handler = self.log_handler.clone();
            move || execute_blocking(spec, run_config, handler)
        })
        .await
        .map_err(|e| RunnerError::ExecutionFailed(e.to_string()))??;
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        if exit_code == 0 {
            info!("`{}` completed in {}ms", cmd_str, duration_ms);
        } else {
            error!(
                "`{}` failed with exit code {} after {}ms",
                cmd_str, exit_code, duration_ms
            );
        }

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_progress_classification() {
        assert_eq!(
            ProgressEvent::classify(LogStream::Stdout, "aws_instance.web: Creating..."),
            Some(ProgressEvent::InProgress)
        );
        assert_eq!(
            ProgressEvent::classify(
                LogStream::Stdout,
                "aws_lb.web: Creation complete after 2m [id=arn]"
            ),
            Some(ProgressEvent::Completed)
        );
        assert_eq!(
            ProgressEvent::classify(LogStream::Stderr, "Error: creating ELBv2"),
            Some(ProgressEvent::Failed)
        );
        // Only stderr errors count as failures
        assert_eq!(ProgressEvent::classify(LogStream::Stdout, "Error: x"), None);
        assert_eq!(ProgressEvent::classify(LogStream::Stdout, "Plan: 3 to add"), None);
    }

    #[tokio::test]
    async fn test_dry_run_executes_nothing() {
        let runner = HostRunner::new(HostRunnerOptions::new().dry_run());
        assert!(runner.is_dry_run());

        let spec = CommandSpec::new("definitely-not-a-real-program").arg("apply");
        let result = runner.run(&spec, &RunConfig::default()).await.unwrap();

        assert!(result.success());
        assert!(result.stdout.contains("definitely-not-a-real-program apply"));
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let runner = HostRunner::new(HostRunnerOptions::default());
        let spec = CommandSpec::new("definitely-not-a-real-program-tfalb");

        let err = runner.run(&spec, &RunConfig::default()).await.unwrap_err();
        assert!(matches!(err, RunnerError::ExecutionFailed(_)));
        assert!(!runner
            .is_available("definitely-not-a-real-program-tfalb")
            .await
            .unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_both_streams_and_exit_code() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let runner = HostRunner::new(HostRunnerOptions::default())
            .with_log_handler(Arc::new(move |line: LogLine| sink.lock().push(line)));

        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("echo out; echo \"Error: boom\" 1>&2; exit 3")
            .env("TFALB_TEST", "1");
        let result = runner.run(&spec, &RunConfig::default()).await.unwrap();

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "Error: boom\n");
        assert_eq!(lines.lock().len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_env_and_workdir_applied() {
        let dir = std::env::temp_dir();
        let runner = HostRunner::new(HostRunnerOptions::default());
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("echo $TFALB_VALUE; pwd")
            .env("TFALB_VALUE", "hello")
            .workdir(&dir);

        let result = runner.run(&spec, &RunConfig::default()).await.unwrap();
        assert!(result.stdout.starts_with("hello\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_child() {
        let runner = HostRunner::new(HostRunnerOptions::default());
        let spec = CommandSpec::new("sleep").arg("5");

        let err = runner
            .run(&spec, &RunConfig::default().timeout(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Timeout(1)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_not_held_by_leftover_process() {
        // `sh` forks `sleep` instead of exec'ing it; the sleep keeps both pipes open
        let runner = HostRunner::new(HostRunnerOptions::default());
        let spec = CommandSpec::new("sh").arg("-c").arg("sleep 8; true");

        let started = Instant::now();
        let err = runner
            .run(&spec, &RunConfig::default().timeout(1))
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::Timeout(1)));
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_utf8_does_not_stop_capture() {
        let runner = HostRunner::new(HostRunnerOptions::default());
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("printf 'Error: first\\n\\377\\nError: after bad byte\\r\\n' 1>&2; exit 1");

        let result = runner.run(&spec, &RunConfig::default()).await.unwrap();

        assert_eq!(result.exit_code, 1);
        assert_eq!(
            result.stderr,
            "Error: first\n\u{FFFD}\nError: after bad byte\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_large_output_fully_drained() {
        let runner = HostRunner::new(HostRunnerOptions::default());
        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("i=0; while [ $i -lt 20000 ]; do echo \"line $i padding padding\"; i=$((i+1)); done");

        let result = runner
            .run(&spec, &RunConfig::default().timeout(30))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.lines().count(), 20000);
        assert!(result.stdout.ends_with("line 19999 padding padding\n"));
    }
}
