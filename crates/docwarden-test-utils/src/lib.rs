//! Test fixtures for docwarden crates.

use docwarden_common_config::{ConfigLoader, WardenConfig};
use docwarden_rules::{Identity, RoleFlags};
use docwarden_store::{Emulator, StoreResult};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// Project id used by the test emulator.
pub const PROJECT_ID: &str = "emulator-rules";
/// The signed-in test caller.
pub const MY_ID: &str = "user_abc";
/// Another user the caller does not own.
pub const THEIR_ID: &str = "user_xyz";
pub const MOD_ID: &str = "user_mod";
/// Display name written by fixture profiles.
pub const SEED_DISPLAY_NAME: &str = "Dominic Steve";
/// Id of the fixture todo.
pub const TODO_ID: &str = "form123";

/// Identity of the signed-in test caller.
pub fn my_auth() -> Identity {
    identity(MY_ID, "abc@gmail.com")
}

/// Identity of the other test user.
pub fn their_auth() -> Identity {
    identity(THEIR_ID, "xyz@gmail.com")
}

/// Moderator whose token carries `isAdmin: true`.
pub fn mod_auth() -> Identity {
    identity(MOD_ID, "mod@gmail.com").with_role_flags(RoleFlags::admin())
}

fn identity(id: &str, email: &str) -> Identity {
    Identity::new(id)
        .expect("fixture ids are non-empty")
        .with_email(email)
}

/// Emulator with default rules and decision audit switched off.
pub fn test_emulator() -> Emulator {
    let mut config = WardenConfig::default();
    config.emulator.project_id = PROJECT_ID.to_string();
    config.audit.log_decisions = false;
    Emulator::new(&config)
}

/// Seed `users/{uid}` through the admin bypass.
pub async fn create_user_doc(emulator: &Emulator, uid: &str, is_admin: bool) -> StoreResult<()> {
    emulator
        .admin_app()
        .collection("users")
        .doc(uid)
        .set(&json!({
            "displayName": SEED_DISPLAY_NAME,
            "uid": uid,
            "isAdmin": is_admin,
        }))
        .await
}

/// Seed `todos/{TODO_ID}` owned by `uid` through the admin bypass.
pub async fn create_todo_doc(emulator: &Emulator, uid: &str) -> StoreResult<()> {
    emulator
        .admin_app()
        .collection("todos")
        .doc(TODO_ID)
        .set(&json!({ "name": "Learn to fly", "uid": uid }))
        .await
}

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary project directory holding `.docwarden/config.yaml`.
pub fn temp_project(config: &WardenConfig) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let loader = ConfigLoader::new(dir.path());
    loader.save(config).expect("Failed to write config");
    let path = loader.config_path();
    (dir, path)
}

/// Assert that a store operation succeeded and return its value.
#[macro_export]
macro_rules! assert_succeeds {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected operation to succeed, got: {e:?}"),
        }
    };
}

/// Assert that a store operation was rejected by the rules.
#[macro_export]
macro_rules! assert_fails {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected permission denied, got Ok: {v:?}"),
            Err(e) => assert!(
                e.is_permission_denied(),
                "Expected permission denied, got: {e:?}"
            ),
        }
    };
}

/// Assert that a store operation was rejected for a specific reason.
#[macro_export]
macro_rules! assert_denied {
    ($expr:expr, $reason:expr) => {
        match $expr {
            Ok(v) => panic!("Expected permission denied, got Ok: {v:?}"),
            Err(e) => assert_eq!(e.deny_reason(), Some($reason), "unexpected error: {e:?}"),
        }
    };
}
