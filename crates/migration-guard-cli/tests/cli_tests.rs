//! End-to-end tests for the migration-guard binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const GUARD_ENV: [&str; 5] = [
    "MIGRATION_GUARD_CONFIG",
    "MIGRATION_GUARD_PREFIX",
    "MIGRATION_GUARD_ALLOWED_SCHEMAS",
    "MIGRATION_GUARD_BLOCKED_SCHEMAS",
    "MIGRATION_GUARD_ALLOWED_EXTENSIONS",
];

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

/// Build a guard command with a clean environment and an empty working directory
fn guard(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_migration-guard"));
    cmd.current_dir(workdir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    for key in GUARD_ENV {
        cmd.env_remove(key);
    }
    cmd
}

fn run_fixture(dir: &str, extra: &[&str]) -> Output {
    let workdir = tempfile::tempdir().unwrap();
    guard(workdir.path())
        .arg("--dir")
        .arg(fixtures().join(dir))
        .arg("--config")
        .arg(fixtures().join("migration-guard.config.json"))
        .args(extra)
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn allowed_fixtures_exit_zero() {
    let output = run_fixture("allowed", &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("migration-guard: OK (3 files)"), "stdout: {stdout}");
}

#[test]
fn blocked_fixtures_exit_one() {
    let output = run_fixture("blocked", &[]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = stderr(&output);
    assert!(stderr.contains("migration-guard: failed (6 issues)"), "stderr: {stderr}");
    assert!(stderr.contains("20240101000000_bad.sql: GRANT/REVOKE is not supported (blocked by policy)"));
    assert!(!stderr.contains("  statement:"));
}

#[test]
fn explain_prints_statements() {
    let output = run_fixture("blocked", &["--explain"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("  statement: grant select on cb_widgets to anon"));
}

#[test]
fn report_flag_writes_json() {
    let out = tempfile::tempdir().unwrap();
    let report = out.path().join("report.json");
    let report_arg = report.to_string_lossy().into_owned();

    let output = run_fixture("blocked", &["--report", &report_arg]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["files_scanned"], 2);
    assert_eq!(json["violations"].as_array().map(Vec::len), Some(6));
    assert_eq!(json["violations"][2]["code"], "GRANT_REVOKE");
}

#[test]
fn env_override_applies() {
    let workdir = tempfile::tempdir().unwrap();
    let output = guard(workdir.path())
        .arg("--dir")
        .arg(fixtures().join("allowed"))
        .env("MIGRATION_GUARD_CONFIG", fixtures().join("migration-guard.config.json"))
        .env("MIGRATION_GUARD_PREFIX", "xy_")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing required prefix for table: cb_widgets"));
}

#[test]
fn missing_prefix_is_a_setup_error() {
    let workdir = tempfile::tempdir().unwrap();
    let config = workdir.path().join("migration-guard.config.json");
    std::fs::write(&config, r#"{ "allowedSchemas": ["public"] }"#).unwrap();

    let output = guard(workdir.path())
        .arg("--dir")
        .arg(fixtures().join("allowed"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("requiredPrefix is missing"));
}

#[test]
fn missing_config_is_a_setup_error() {
    let workdir = tempfile::tempdir().unwrap();
    let output = guard(workdir.path())
        .arg("--dir")
        .arg(fixtures().join("allowed"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_directory_is_a_setup_error() {
    let output = run_fixture("does-not-exist", &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("migrations directory not found"));
}

#[test]
fn empty_directory_is_a_setup_error() {
    let empty = tempfile::tempdir().unwrap();
    let workdir = tempfile::tempdir().unwrap();
    let output = guard(workdir.path())
        .arg("--dir")
        .arg(empty.path())
        .arg("--config")
        .arg(fixtures().join("migration-guard.config.json"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no .sql files found"));
}
