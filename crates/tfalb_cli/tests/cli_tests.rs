//! End-to-end tests of the `tfalb` binary for commands that need no cloud access.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn write_config(temp: &TempDir, templates: &Path) -> PathBuf {
    let path = temp.path().join("tfalb.yaml");
    let yaml = format!(
        "templates_dir: {}\ngenerated_dir: {}\noutput_path: {}\n",
        templates.display(),
        temp.path().join("generated").display(),
        temp.path().join("aws_validation.json").display(),
    );
    fs::write(&path, yaml).unwrap();
    path
}

fn tfalb(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tfalb"))
        .args(args)
        .env_remove("TFALB_CONFIG")
        .env_remove("TFALB_OUTPUT")
        .output()
        .unwrap()
}

#[test]
fn test_help_lists_commands() {
    let output = tfalb(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["deploy", "validate", "destroy", "render"] {
        assert!(stdout.contains(command), "missing {command}");
    }
}

#[test]
fn test_render_to_stdout_coerces_region() {
    let temp = tempdir().unwrap();
    let config = write_config(&temp, &templates_dir());

    let output = tfalb(&[
        "--config",
        config.to_str().unwrap(),
        "render",
        "--ami",
        "ubuntu",
        "--instance-type",
        "t3.small",
        "--region",
        "us-west-1",
        "--alb-name",
        "my-alb",
        "--stdout",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("region = \"us-east-2\""));
    assert!(stdout.contains("ami-0c995fbcf99222492"));
    assert!(!stdout.contains("region = \"us-west-1\""));
    assert!(!stdout.contains("{{"));
}

#[test]
fn test_render_writes_main_tf() {
    let temp = tempdir().unwrap();
    let config = write_config(&temp, &templates_dir());

    let output = tfalb(&[
        "--config",
        config.to_str().unwrap(),
        "render",
        "--ami",
        "amazon_linux",
        "--instance-type",
        "t3.medium",
        "--alb-name",
        "web-alb",
    ]);

    assert!(output.status.success());
    let main_tf = fs::read_to_string(temp.path().join("generated/main.tf")).unwrap();
    assert!(main_tf.contains("\"web-alb\""));
    assert!(main_tf.contains("\"t3.medium\""));
}

#[test]
fn test_invalid_alb_name_exits_with_input_error() {
    let temp = tempdir().unwrap();
    let config = write_config(&temp, &templates_dir());

    let output = tfalb(&[
        "--config",
        config.to_str().unwrap(),
        "render",
        "--ami",
        "ubuntu",
        "--instance-type",
        "t3.small",
        "--alb-name",
        "us-east-2",
    ]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_template_exits_with_template_error() {
    let temp = tempdir().unwrap();
    let config = write_config(&temp, &temp.path().join("no-templates"));

    let output = tfalb(&[
        "--config",
        config.to_str().unwrap(),
        "render",
        "--ami",
        "ubuntu",
        "--instance-type",
        "t3.small",
        "--alb-name",
        "my-alb",
    ]);

    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Template not found"));
}

#[test]
fn test_missing_config_file_exits_with_input_error() {
    let output = tfalb(&["--config", "/definitely/not/here.yaml", "render"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_dry_run_deploy_writes_no_record() {
    let temp = tempdir().unwrap();
    let config = write_config(&temp, &templates_dir());

    let output = tfalb(&[
        "--config",
        config.to_str().unwrap(),
        "--dry-run",
        "deploy",
        "--ami",
        "ubuntu",
        "--instance-type",
        "t3.small",
        "--alb-name",
        "my-alb",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(temp.path().join("generated/main.tf").exists());
    assert!(!temp.path().join("aws_validation.json").exists());
}
