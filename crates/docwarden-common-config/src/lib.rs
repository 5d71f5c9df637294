//! Configuration types for docwarden.
//!
//! This crate provides the configuration used by the emulator and the CLI,
//! read from `.docwarden/config.yaml` files.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = WardenConfig::default();

        assert_eq!(config.emulator.project_id, "emulator-rules");
        assert!(config.policy.validate_schema);
        assert!(config.policy.resolve_admin_from_profile);
        assert!(config.audit.log_decisions);
    }

    #[test]
    fn test_config_serializes_to_yaml() {
        let yaml = serde_yaml::to_string(&WardenConfig::default()).unwrap();

        assert!(yaml.contains("emulator:"));
        assert!(yaml.contains("policy:"));
        assert!(yaml.contains("audit:"));
        assert!(yaml.contains("project_id: emulator-rules"));
    }

    #[test]
    fn test_partial_configs_merge_with_defaults() {
        let partial_yaml = r#"
policy:
  resolve_admin_from_profile: false
"#;

        let config: WardenConfig = serde_yaml::from_str(partial_yaml).unwrap();

        assert!(!config.policy.resolve_admin_from_profile);
        assert!(config.policy.validate_schema);
        assert_eq!(config.emulator.project_id, "emulator-rules");
    }
}
