//! Configuration types.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Emulator configuration.
    pub emulator: EmulatorConfig,
    /// Policy enforcement configuration.
    pub policy: PolicyConfig,
    /// Decision audit configuration.
    pub audit: AuditConfig,
}

/// In-process emulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Project the emulated database belongs to.
    pub project_id: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            project_id: "emulator-rules".to_string(),
        }
    }
}

/// How guarded operations are checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Type-check known fields of `users` and `todos` documents on write.
    pub validate_schema: bool,
    /// Read the caller's own profile to decide admin status when the
    /// identity token does not carry the flag.
    pub resolve_admin_from_profile: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            validate_schema: true,
            resolve_admin_from_profile: true,
        }
    }
}

/// Decision audit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Emit a structured event for every decision.
    pub log_decisions: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_decisions: true,
        }
    }
}
