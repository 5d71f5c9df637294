//! Store error types.

use docwarden_rules::{DenyReason, DocumentError, Operation, PathError};
use std::collections::HashMap;
use thiserror::Error;

/// Store operation result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Field name to validation messages.
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("permission denied: {operation} on {path} ({reason})")]
    PermissionDenied {
        operation: Operation,
        path: String,
        reason: DenyReason,
    },

    #[error("validation failed: {}", describe_fields(.0))]
    ValidationError(FieldErrors),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] DocumentError),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidPath(_) => "INVALID_PATH",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Backend(_) => "BACKEND_ERROR",
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Deny reason, for permission errors.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::PermissionDenied { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Per-field messages, for validation errors.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::ValidationError(fields) => Some(fields),
            _ => None,
        }
    }
}

fn describe_fields(fields: &FieldErrors) -> String {
    let mut parts: Vec<String> = fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect();
    parts.sort();
    parts.join("; ")
}
