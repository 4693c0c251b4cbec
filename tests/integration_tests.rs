//! Integration tests for the Skylens CLI
//!
//! Everything here runs offline; requests that would reach the network are
//! pointed at a closed local port.

use std::process::Command;

fn skylens(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .env("SKYLENS_API_BASE", "http://127.0.0.1:9")
        .env("SKYLENS_BACKEND__MAX_RETRIES", "0")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn combined(output: &std::process::Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Test that the CLI shows help with an explicit help flag
#[test]
fn test_cli_help() {
    let output = skylens(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skylens"));
    assert!(stdout.contains("weather dashboard"));
    assert!(stdout.contains("suggest"));
}

/// Test that the weather subcommand documents its options
#[test]
fn test_weather_help() {
    let output = skylens(&["weather", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--location"));
    assert!(stdout.contains("--date"));
    assert!(stdout.contains("--json"));
}

/// Test that running without a subcommand prints the config summary
#[test]
fn test_config_summary() {
    let output = skylens(&[]);

    assert!(output.status.success(), "{}", combined(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Using config from"));
    assert!(stdout.contains("Backend: http://127.0.0.1:9"));
    assert!(stdout.contains("Log level: info"));
}

/// Test that an empty location is rejected before any request
#[test]
fn test_weather_empty_location() {
    let output = skylens(&["weather", "--location", "   "]);

    assert!(!output.status.success());
    assert!(combined(&output).contains("Invalid input"));
}

/// Test that a malformed date is rejected
#[test]
fn test_weather_invalid_date() {
    let output = skylens(&["weather", "--location", "Bern", "--date", "June 2nd"]);

    assert!(!output.status.success());
    assert!(combined(&output).contains("Invalid input"));
}

/// Test that an unreachable backend yields the generic search failure
#[test]
fn test_weather_backend_unreachable() {
    let output = skylens(&["weather", "--location", "Bern"]);

    assert!(!output.status.success());
    assert!(combined(&output).contains("Location not found. Please try again."));
}

/// Test that a broken config file is reported
#[test]
fn test_invalid_config_file() {
    let path = std::env::temp_dir().join(format!("skylens-bad-{}.toml", std::process::id()));
    std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();

    let output = skylens(&["--config", path.to_str().unwrap()]);
    std::fs::remove_file(&path).unwrap();

    assert!(!output.status.success());
    assert!(combined(&output).contains("Invalid log level"));
}
