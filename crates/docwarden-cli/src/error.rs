//! CLI error handling.

use std::process::ExitCode;

use docwarden_common_config::{ConfigError, EnvError};
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Validation { .. } => "E004",
            Self::Output(_) => "E008",
            Self::Other(_) => "E999",
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Self::Config { .. } => 2,
            Self::Validation { .. } => 5,
            Self::Output(_) => 3,
            Self::Other(_) => 5,
        };
        ExitCode::from(code)
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// Create a validation error for an argument
    pub fn invalid_arg(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::EnvVarNotFound { var } => Some(format!("set {var} or give it a default")),
            ConfigError::ValidationError { .. } => {
                Some("check .docwarden/config.yaml".to_string())
            }
            _ => None,
        };
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
            hint,
        }
    }
}

impl From<EnvError> for CliError {
    fn from(err: EnvError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
            hint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = CliError::invalid_arg("path", "bad path");
        assert_eq!(err.code(), "E004");
        assert_eq!(err.to_string(), "bad path");
    }

    #[test]
    fn test_config_error_hint() {
        let err = CliError::from(ConfigError::EnvVarNotFound {
            var: "PROJECT".to_string(),
        });
        assert_eq!(err.code(), "E001");
        assert_eq!(err.hint(), Some("set PROJECT or give it a default"));
    }
}
