//! Error types for building rule inputs.
//!
//! Policy evaluation itself never fails; these errors come from constructing
//! identities, paths and documents out of untrusted input.

use thiserror::Error;

/// Document path errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("document path must have the form collection/id: {0}")]
    Malformed(String),

    #[error("empty {0} segment")]
    EmptySegment(&'static str),

    #[error("invalid {segment} segment: {value}")]
    InvalidSegment { segment: &'static str, value: String },
}

/// Identity construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity id must not be empty")]
    EmptyId,
}

/// Document conversion errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
