//! Environment variable handling.

use crate::types::WardenConfig;
use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    pub const DOCWARDEN_CONFIG_PATH: &str = "DOCWARDEN_CONFIG_PATH";
    pub const DOCWARDEN_PROJECT_ID: &str = "DOCWARDEN_PROJECT_ID";
    pub const DOCWARDEN_VALIDATE_SCHEMA: &str = "DOCWARDEN_VALIDATE_SCHEMA";
    pub const DOCWARDEN_AUDIT: &str = "DOCWARDEN_AUDIT";
}

/// Environment configuration.
pub struct Environment {
    _guard: (), // Prevent construction outside module
}

impl Environment {
    /// Initialize environment from .env files.
    pub fn init() -> Result<Self, EnvError> {
        // Load .env files in order (later overrides earlier)
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        Ok(Self { _guard: () })
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        env::var(var).unwrap_or_else(|_| default.to_string())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Result<Option<bool>, EnvError> {
        match env::var(var) {
            Ok(v) => match v.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(EnvError::InvalidValue {
                    var: var.to_string(),
                    message: format!("expected boolean, got {v}"),
                }),
            },
            Err(_) => Ok(None),
        }
    }

    /// Apply `DOCWARDEN_*` overrides on top of a loaded configuration.
    pub fn apply_overrides(config: &mut WardenConfig) -> Result<(), EnvError> {
        if let Some(project_id) = Self::get(vars::DOCWARDEN_PROJECT_ID) {
            config.emulator.project_id = project_id;
        }
        if let Some(validate) = Self::get_bool(vars::DOCWARDEN_VALIDATE_SCHEMA)? {
            config.policy.validate_schema = validate;
        }
        if let Some(audit) = Self::get_bool(vars::DOCWARDEN_AUDIT)? {
            config.audit.log_decisions = audit;
        }
        Ok(())
    }
}
