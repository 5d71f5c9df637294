//! Access requests and the decisions returned for them.

use crate::{
    document::Document,
    types::{DocumentPath, Identity, Operation},
};
use serde::Serialize;
use std::fmt;

/// Everything the policy may look at for one operation.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub identity: Option<&'a Identity>,
    pub operation: Operation,
    pub path: &'a DocumentPath,
    /// Stored document before the operation.
    pub existing: Option<&'a Document>,
    /// Document as it would exist after a write.
    pub proposed: Option<&'a Document>,
}

impl<'a> AccessRequest<'a> {
    pub fn new(identity: Option<&'a Identity>, operation: Operation, path: &'a DocumentPath) -> Self {
        Self {
            identity,
            operation,
            path,
            existing: None,
            proposed: None,
        }
    }

    pub fn with_existing(mut self, existing: Option<&'a Document>) -> Self {
        self.existing = existing;
        self
    }

    pub fn with_proposed(mut self, proposed: Option<&'a Document>) -> Self {
        self.proposed = proposed;
        self
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No caller identity.
    Unauthenticated,
    /// The caller does not own the document.
    NotOwner,
    /// The operation needs an admin caller.
    NotAdmin,
    /// The write would set or change `isAdmin`.
    AdminFlagLocked,
    /// The rule needs a document that does not exist.
    MissingDocument,
    /// No rule grants this operation on this collection.
    NoMatchingRule,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotOwner => "not_owner",
            Self::NotAdmin => "not_admin",
            Self::AdminFlagLocked => "admin_flag_locked",
            Self::MissingDocument => "missing_document",
            Self::NoMatchingRule => "no_matching_rule",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "caller is not authenticated",
            Self::NotOwner => "caller does not own the document",
            Self::NotAdmin => "caller is not an admin",
            Self::AdminFlagLocked => "the isAdmin field cannot be changed",
            Self::MissingDocument => "document does not exist",
            Self::NoMatchingRule => "no rule allows this operation",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of evaluating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Decision {
    Allow { rule: String },
    Deny { reason: DenyReason },
}

impl Decision {
    pub fn allow(rule: impl Into<String>) -> Self {
        Self::Allow { rule: rule.into() }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self::Deny { reason }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn is_deny(&self) -> bool {
        !self.is_allow()
    }

    /// Name of the rule that granted the request.
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::Allow { rule } => Some(rule),
            Self::Deny { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow { .. } => None,
            Self::Deny { reason } => Some(*reason),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow { rule } => write!(f, "ALLOW ({rule})"),
            Self::Deny { reason } => write!(f, "DENY ({})", reason.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_accessors() {
        let allow = Decision::allow("todos.owner_access");
        assert!(allow.is_allow());
        assert_eq!(allow.rule(), Some("todos.owner_access"));
        assert_eq!(allow.reason(), None);
        assert_eq!(allow.to_string(), "ALLOW (todos.owner_access)");

        let deny = Decision::deny(DenyReason::NotOwner);
        assert!(deny.is_deny());
        assert_eq!(deny.reason(), Some(DenyReason::NotOwner));
        assert_eq!(deny.to_string(), "DENY (not_owner)");
    }

    #[test]
    fn test_decision_serializes_tagged() {
        let json = serde_json::to_value(Decision::deny(DenyReason::AdminFlagLocked)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"effect": "deny", "reason": "admin_flag_locked"})
        );
    }
}
