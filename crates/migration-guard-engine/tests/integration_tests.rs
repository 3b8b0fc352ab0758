//! Integration tests running the scanner over the fixture migrations

use migration_guard_core::{EnvOverrides, Policy, ViolationCode};
use migration_guard_engine::Scanner;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn fixture_policy() -> Policy {
    Policy::load(
        &fixtures().join("migration-guard.config.json"),
        EnvOverrides::default(),
    )
    .unwrap()
}

#[test]
fn allowed_fixtures_pass() {
    let policy = fixture_policy();
    let result = Scanner::new(&policy).scan_dir(&fixtures().join("allowed")).unwrap();

    assert_eq!(result.files_scanned, 3);
    assert!(result.is_clean(), "unexpected violations: {:#?}", result.violations);
}

#[test]
fn blocked_fixtures_fail_with_every_violation() {
    let policy = fixture_policy();
    let result = Scanner::new(&policy).scan_dir(&fixtures().join("blocked")).unwrap();

    assert_eq!(result.files_scanned, 2);

    let codes: Vec<ViolationCode> = result.violations.iter().map(|v| v.code).collect();
    assert_eq!(
        codes,
        vec![
            // 20240101000000_bad.sql
            ViolationCode::MissingPrefix,
            ViolationCode::BlockedSchema,
            ViolationCode::GrantRevoke,
            ViolationCode::ExtensionNotSupported,
            // 20240102000000_more.sql
            ViolationCode::UnrecognizedDdl,
            ViolationCode::MissingPrefix,
        ]
    );

    let messages: Vec<&str> = result.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages[1], "blocked schema reference: auth");
    assert_eq!(messages[5], "missing required prefix for foreign key: widgets");
}

#[test]
fn env_overrides_change_the_outcome() {
    let overrides = EnvOverrides {
        allowed_extensions: Some(vec!["pgcrypto".to_string()]),
        ..EnvOverrides::default()
    };
    let policy = Policy::load(&fixtures().join("migration-guard.config.json"), overrides).unwrap();
    let result = Scanner::new(&policy).scan_dir(&fixtures().join("blocked")).unwrap();

    assert!(result
        .violations
        .iter()
        .all(|v| v.code != ViolationCode::ExtensionNotSupported));
    assert_eq!(result.issue_count(), 5);
}
