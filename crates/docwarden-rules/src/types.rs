//! Authorization types: operations, collections, paths and identities.

use crate::error::{IdentityError, PathError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operations that can be performed on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Every operation, in evaluation-table order.
    pub const ALL: [Operation; 4] = [
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "get" => Some(Self::Read),
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Whether the operation mutates storage.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Document collections known to the policy.
///
/// Anything that is not `users` or `todos` is unclassified and falls through
/// to the default-deny rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Collection {
    Users,
    Todos,
    Other(String),
}

impl Collection {
    pub fn parse(name: &str) -> Self {
        match name {
            "users" => Self::Users,
            "todos" => Self::Todos,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Users => "users",
            Self::Todos => "todos",
            Self::Other(name) => name,
        }
    }

    /// Whether any rule in the default policy targets this collection.
    pub fn is_classified(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for Collection {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<Collection> for String {
    fn from(collection: Collection) -> Self {
        collection.as_str().to_string()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Location of a single document: `collection/id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: Collection,
    id: String,
}

impl DocumentPath {
    /// Build a path from its two segments.
    pub fn new(collection: &str, id: &str) -> Result<Self, PathError> {
        validate_segment("collection", collection)?;
        validate_segment("document id", id)?;
        Ok(Self {
            collection: Collection::parse(collection),
            id: id.to_string(),
        })
    }

    /// Parse `collection/id`.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let (collection, id) = path
            .split_once('/')
            .ok_or_else(|| PathError::Malformed(path.to_string()))?;
        Self::new(collection, id)
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn validate_segment(segment: &'static str, value: &str) -> Result<(), PathError> {
    if value.is_empty() {
        return Err(PathError::EmptySegment(segment));
    }
    if value.contains('/') {
        return Err(PathError::InvalidSegment {
            segment,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Role flags carried by an identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl RoleFlags {
    pub fn admin() -> Self {
        Self { is_admin: Some(true) }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin == Some(true)
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentityToken", into = "IdentityToken")]
pub struct Identity {
    id: String,
    email: Option<String>,
    role_flags: RoleFlags,
}

/// Wire shape of an identity token: `{ uid, email?, isAdmin? }`.
#[derive(Serialize, Deserialize)]
struct IdentityToken {
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(flatten)]
    role_flags: RoleFlags,
}

impl TryFrom<IdentityToken> for Identity {
    type Error = IdentityError;

    fn try_from(token: IdentityToken) -> Result<Self, Self::Error> {
        let mut identity = Identity::new(token.uid)?.with_role_flags(token.role_flags);
        identity.email = token.email;
        Ok(identity)
    }
}

impl From<Identity> for IdentityToken {
    fn from(identity: Identity) -> Self {
        Self {
            uid: identity.id,
            email: identity.email,
            role_flags: identity.role_flags,
        }
    }
}

impl Identity {
    /// Create an identity with no role flags.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(IdentityError::EmptyId);
        }
        Ok(Self {
            id,
            email: None,
            role_flags: RoleFlags::default(),
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_role_flags(mut self, role_flags: RoleFlags) -> Self {
        self.role_flags = role_flags;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role_flags(&self) -> &RoleFlags {
        &self.role_flags
    }

    /// Check if the identity carries the admin flag.
    pub fn is_admin(&self) -> bool {
        self.role_flags.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("read" => Some(Operation::Read))]
    #[test_case("GET" => Some(Operation::Read) ; "get alias")]
    #[test_case("Update" => Some(Operation::Update))]
    #[test_case("delete" => Some(Operation::Delete))]
    #[test_case("merge" => None)]
    fn test_operation_parse(raw: &str) -> Option<Operation> {
        Operation::parse(raw)
    }

    #[test]
    fn test_write_operations() {
        assert!(!Operation::Read.is_write());
        assert!(Operation::Create.is_write());
        assert!(Operation::Delete.is_write());
    }

    #[test]
    fn test_collection_classification() {
        assert_eq!(Collection::parse("users"), Collection::Users);
        assert_eq!(Collection::parse("todos"), Collection::Todos);
        assert_eq!(
            Collection::parse("test_documents"),
            Collection::Other("test_documents".into())
        );
        assert!(!Collection::parse("Users").is_classified());
    }

    #[test]
    fn test_path_parse() {
        let path = DocumentPath::parse("todos/form123").unwrap();
        assert_eq!(path.collection(), &Collection::Todos);
        assert_eq!(path.id(), "form123");
        assert_eq!(path.to_string(), "todos/form123");
    }

    #[test]
    fn test_path_rejects_bad_segments() {
        assert!(matches!(
            DocumentPath::parse("users"),
            Err(PathError::Malformed(_))
        ));
        assert!(matches!(
            DocumentPath::parse("users/"),
            Err(PathError::EmptySegment("document id"))
        ));
        assert!(matches!(
            DocumentPath::parse("users/a/b"),
            Err(PathError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn test_identity_requires_id() {
        assert!(matches!(Identity::new(""), Err(IdentityError::EmptyId)));
        assert!(matches!(Identity::new("  "), Err(IdentityError::EmptyId)));

        let identity = Identity::new("user_abc").unwrap().with_email("abc@gmail.com");
        assert_eq!(identity.id(), "user_abc");
        assert_eq!(identity.email(), Some("abc@gmail.com"));
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_identity_token_shape() {
        let identity: Identity = serde_json::from_str(
            r#"{"uid":"user_mod","email":"mod@gmail.com","isAdmin":true}"#,
        )
        .unwrap();
        assert_eq!(identity.id(), "user_mod");
        assert!(identity.is_admin());

        let empty: Result<Identity, _> = serde_json::from_str(r#"{"uid":""}"#);
        assert!(empty.is_err());
    }
}
