//! `bbank config` behaviour, run against the built binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn bbank(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bbank"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("bad.toml");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_validate_reports_invalid_file_with_failure_status() {
    let home = tempfile::tempdir().unwrap();
    let bad = write_config(home.path(), "[latency]\nscale_percent = 99999\n");

    let output = bbank(home.path(), &["config", "validate", "--file", &bad]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Validating configuration"));
    assert!(!stdout.contains("Configuration is valid"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("scale_percent"));
}

#[test]
fn test_validate_reaches_handler_when_active_config_is_broken() {
    let home = tempfile::tempdir().unwrap();
    let bad = write_config(home.path(), "[latency]\nscale_percent = 99999\n");

    let output = bbank(home.path(), &["--config", &bad, "config", "validate"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Validating configuration"));
    assert!(stdout.contains("bad.toml"));
}

#[test]
fn test_validate_accepts_good_file() {
    let home = tempfile::tempdir().unwrap();
    let good = write_config(home.path(), "[latency]\nenabled = false\n");

    let output = bbank(home.path(), &["config", "validate", "--file", &good]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_config_path_follows_global_flag() {
    let home = tempfile::tempdir().unwrap();
    let bad = write_config(home.path(), "not = [valid");

    let output = bbank(home.path(), &["--config", &bad, "config", "path"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("bad.toml"));
}
