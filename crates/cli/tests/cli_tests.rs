//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "runwatch-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Monitors a container"),
        "Should show app description"
    );
    assert!(
        stdout.contains("--container"),
        "Should show container option"
    );
    assert!(
        stdout.contains("--namespace"),
        "Should show namespace option"
    );
    assert!(
        stdout.contains("--interval-secs"),
        "Should show interval option"
    );
    assert!(
        stdout.contains("--kubeconfig"),
        "Should show kubeconfig option"
    );
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "runwatch-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("runwatch"), "Should show binary name");
}

/// Test format option
#[test]
fn test_format_option() {
    let output = Command::new("cargo")
        .args(["run", "-p", "runwatch-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test environment variable fallbacks are documented in help
#[test]
fn test_env_var_fallbacks() {
    let output = Command::new("cargo")
        .args(["run", "-p", "runwatch-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("RUNWATCH_CONTAINER"),
        "Should show container env var"
    );
    assert!(
        stdout.contains("RUNWATCH_NAMESPACE"),
        "Should show namespace env var"
    );
}

/// Test missing required argument error handling
#[test]
fn test_missing_argument() {
    let output = Command::new("cargo")
        .args(["run", "-p", "runwatch-cli", "--"])
        .env_remove("RUNWATCH_CONTAINER")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Missing arguments should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("error"),
        "Should show error about missing arguments"
    );
}

/// Test invalid format value error handling
#[test]
fn test_invalid_format() {
    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "runwatch-cli",
            "--",
            "batch-job-x7k",
            "--container",
            "worker",
            "--format",
            "yaml",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Invalid format should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value") || stderr.contains("error"),
        "Should show error about invalid format"
    );
}
