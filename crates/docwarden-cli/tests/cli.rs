//! Binary-level tests for the `docwarden` command.

use assert_cmd::Command;
use docwarden_common_config::{vars, WardenConfig};
use docwarden_test_utils::{temp_dir, temp_project};
use predicates::prelude::*;

fn docwarden(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("docwarden").unwrap();
    cmd.current_dir(dir)
        .env_remove(vars::DOCWARDEN_CONFIG_PATH)
        .env_remove(vars::DOCWARDEN_PROJECT_ID)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_allow_exits_zero() {
    let dir = temp_dir();
    docwarden(dir.path())
        .args([
            "check",
            "--uid",
            "user_abc",
            "--op",
            "create",
            "--path",
            "todos/form123",
            "--proposed",
            r#"{"name":"Learn to swim","uid":"user_abc"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ALLOW (todos.owner_create)"));
}

#[test]
fn test_deny_exits_one() {
    let dir = temp_dir();
    docwarden(dir.path())
        .args([
            "check",
            "--uid",
            "user_abc",
            "--op",
            "update",
            "--path",
            "users/user_xyz",
            "--existing",
            r#"{"displayName":"Dominic Steve","uid":"user_xyz","isAdmin":false}"#,
            "--proposed",
            r#"{"displayName":"Sarah Adams","uid":"user_xyz","isAdmin":false}"#,
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DENY (not_admin)"));
}

#[test]
fn test_json_output() {
    let dir = temp_dir();
    docwarden(dir.path())
        .args([
            "--format",
            "json",
            "check",
            "--op",
            "read",
            "--path",
            "test_documents/doc123",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""reason": "unauthenticated""#));
}

#[test]
fn test_invalid_path_is_an_input_error() {
    let dir = temp_dir();
    docwarden(dir.path())
        .args(["check", "--uid", "user_abc", "--op", "read", "--path", "todos"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("E004"));
}

#[test]
fn test_rules_table_uses_configured_project() {
    let mut config = WardenConfig::default();
    config.emulator.project_id = "todo-app".to_string();
    let (dir, _path) = temp_project(&config);

    docwarden(dir.path())
        .args(["--format", "json", "rules", "--collection", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""project_id": "todo-app""#))
        .stdout(predicate::str::contains("users.self_registration"))
        .stdout(predicate::str::contains("todos.owner_access").not());
}

#[test]
fn test_invalid_config_exits_two() {
    let dir = temp_dir();
    let config_dir = dir.path().join(".docwarden");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.yaml"), "emulator:\n  project_id: Not_Valid\n").unwrap();

    docwarden(dir.path())
        .arg("rules")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("project_id"));
}
