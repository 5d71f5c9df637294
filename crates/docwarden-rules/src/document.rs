//! Schemaless JSON documents and the typed models stored in them.

use crate::error::DocumentError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the owning identity id.
pub const UID_FIELD: &str = "uid";
/// Field holding a profile's admin flag.
pub const ADMIN_FIELD: &str = "isAdmin";
pub const DISPLAY_NAME_FIELD: &str = "displayName";
pub const NAME_FIELD: &str = "name";

/// A stored document: a JSON object keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from any JSON value; only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DocumentError::NotAnObject(json_kind(&other))),
        }
    }

    /// Serialize a typed model into a document.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Deserialize the document into a typed model.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DocumentError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Shallow merge: fields in `patch` overwrite fields in `self`.
    pub fn merged(&self, patch: &Document) -> Document {
        let mut merged = self.0.clone();
        for (field, value) in patch.fields() {
            merged.insert(field.clone(), value.clone());
        }
        Self(merged)
    }

    /// Owning identity id, if the `uid` field is a string.
    pub fn uid(&self) -> Option<&str> {
        self.get_str(UID_FIELD)
    }

    pub fn admin_flag(&self) -> AdminFlag {
        match self.0.get(ADMIN_FIELD) {
            None | Some(Value::Null) => AdminFlag::Unset,
            Some(Value::Bool(flag)) => AdminFlag::Set(*flag),
            Some(_) => AdminFlag::Malformed,
        }
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// State of a document's `isAdmin` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminFlag {
    /// Field missing or null.
    Unset,
    Set(bool),
    /// Present but not a boolean.
    Malformed,
}

impl AdminFlag {
    /// Effective admin status; unset reads as `false`, malformed has none.
    pub fn effective(&self) -> Option<bool> {
        match self {
            Self::Unset => Some(false),
            Self::Set(flag) => Some(*flag),
            Self::Malformed => None,
        }
    }
}

/// Effective admin flag of an optional document; a missing document reads as
/// a non-admin.
pub fn effective_admin(document: Option<&Document>) -> Option<bool> {
    document.map_or(Some(false), |doc| doc.admin_flag().effective())
}

/// Profile stored in `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub uid: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserProfile {
    pub fn new(uid: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            uid: uid.into(),
            is_admin: false,
        }
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

/// Item stored in `todos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub name: String,
    pub uid: String,
}

impl TodoItem {
    pub fn new(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_only_objects_are_documents() {
        assert!(matches!(
            Document::from_value(json!(["a"])),
            Err(DocumentError::NotAnObject("array"))
        ));
        assert!(Document::from_value(json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_merge_is_shallow() {
        let existing = doc(json!({"name": "Learn to fly", "uid": "user_abc", "tags": {"a": 1}}));
        let patch = doc(json!({"name": "Learn to swim", "tags": {"b": 2}}));

        let merged = existing.merged(&patch);
        assert_eq!(merged.get_str("name"), Some("Learn to swim"));
        assert_eq!(merged.uid(), Some("user_abc"));
        assert_eq!(merged.get("tags"), Some(&json!({"b": 2})));
    }

    #[test]
    fn test_admin_flag_states() {
        assert_eq!(doc(json!({})).admin_flag(), AdminFlag::Unset);
        assert_eq!(doc(json!({"isAdmin": null})).admin_flag(), AdminFlag::Unset);
        assert_eq!(doc(json!({"isAdmin": true})).admin_flag(), AdminFlag::Set(true));
        assert_eq!(doc(json!({"isAdmin": "yes"})).admin_flag(), AdminFlag::Malformed);

        assert_eq!(AdminFlag::Unset.effective(), Some(false));
        assert_eq!(AdminFlag::Malformed.effective(), None);
        assert_eq!(effective_admin(None), Some(false));
    }

    #[test]
    fn test_typed_models_use_wire_names() {
        let profile = UserProfile::new("user_abc", "Dominic Steve");
        let document = Document::from_serializable(&profile).unwrap();
        assert_eq!(document.get_str(DISPLAY_NAME_FIELD), Some("Dominic Steve"));
        assert_eq!(document.admin_flag(), AdminFlag::Set(false));

        let back: UserProfile = document.deserialize().unwrap();
        assert_eq!(back, profile);

        let todo: TodoItem = doc(json!({"name": "Learn to fly", "uid": "user_abc"}))
            .deserialize()
            .unwrap();
        assert_eq!(todo, TodoItem::new("Learn to fly", "user_abc"));
    }
}
