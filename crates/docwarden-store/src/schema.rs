//! Field type checks for known collections.

use crate::error::{FieldErrors, StoreError, StoreResult};
use docwarden_rules::document::{ADMIN_FIELD, DISPLAY_NAME_FIELD, NAME_FIELD, UID_FIELD};
use docwarden_rules::{Collection, Document};
use serde_json::Value;

/// Expected JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    String,
    /// Boolean, or null for "unset".
    OptionalBool,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::OptionalBool => value.is_boolean() || value.is_null(),
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::String => "must be a string",
            Self::OptionalBool => "must be a boolean",
        }
    }
}

const USER_FIELDS: &[(&str, FieldType)] = &[
    (DISPLAY_NAME_FIELD, FieldType::String),
    (UID_FIELD, FieldType::String),
    (ADMIN_FIELD, FieldType::OptionalBool),
];

const TODO_FIELDS: &[(&str, FieldType)] = &[
    (NAME_FIELD, FieldType::String),
    (UID_FIELD, FieldType::String),
];

fn known_fields(collection: &Collection) -> &'static [(&'static str, FieldType)] {
    match collection {
        Collection::Users => USER_FIELDS,
        Collection::Todos => TODO_FIELDS,
        Collection::Other(_) => &[],
    }
}

/// Type-check the known fields of a document about to be stored.
///
/// Absent fields and unknown fields pass; present known fields must have the
/// expected type.
pub fn validate(collection: &Collection, document: &Document) -> StoreResult<()> {
    let mut errors = FieldErrors::new();

    for (field, expected) in known_fields(collection) {
        if let Some(value) = document.get(field) {
            if !expected.accepts(value) {
                errors
                    .entry((*field).to_string())
                    .or_default()
                    .push(expected.message().to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(StoreError::ValidationError(errors))
    }
}
