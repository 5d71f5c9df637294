//! Rule definitions and rule sets.
//!
//! A rule targets one collection and a set of operations and carries a
//! predicate from a fixed catalogue. Rules are evaluated in order; the first
//! rule whose predicate allows the request wins, otherwise the request is
//! denied.

use crate::{
    decision::{AccessRequest, DenyReason},
    document::effective_admin,
    types::{Collection, Identity, Operation},
};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

/// Result of checking one predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
    /// The predicate does not cover this request; evaluation moves on.
    NotApplicable,
}

/// Predicate catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Any authenticated caller.
    Authenticated,
    /// Stored document's `uid` equals the caller's id.
    OwnsExisting,
    /// Written document's `uid` equals the caller's id.
    OwnsProposed,
    /// Caller's own document with their own `uid` and no admin flag.
    SelfRegistration,
    /// Caller's own document (`docId == id`) with `isAdmin` unchanged.
    OwnProfile,
    /// Admin caller on someone else's document with `isAdmin` unchanged.
    AdminOverOthers,
}

impl Predicate {
    /// Check the predicate for an authenticated caller.
    pub fn evaluate(&self, identity: &Identity, request: &AccessRequest<'_>) -> Verdict {
        match self {
            Self::Authenticated => Verdict::Allow,
            Self::OwnsExisting => match request.existing {
                None => Verdict::Deny(DenyReason::MissingDocument),
                Some(doc) => owner_verdict(doc.uid(), identity),
            },
            Self::OwnsProposed => match request.proposed {
                None => Verdict::Deny(DenyReason::MissingDocument),
                Some(doc) => owner_verdict(doc.uid(), identity),
            },
            Self::SelfRegistration => {
                if request.path.id() != identity.id() {
                    return Verdict::Deny(DenyReason::NotOwner);
                }
                let Some(doc) = request.proposed else {
                    return Verdict::Deny(DenyReason::MissingDocument);
                };
                match owner_verdict(doc.uid(), identity) {
                    Verdict::Allow if doc.admin_flag().effective() == Some(false) => Verdict::Allow,
                    Verdict::Allow => Verdict::Deny(DenyReason::AdminFlagLocked),
                    other => other,
                }
            }
            Self::OwnProfile => {
                if request.path.id() != identity.id() {
                    return Verdict::NotApplicable;
                }
                admin_flag_verdict(request)
            }
            Self::AdminOverOthers => {
                if request.path.id() == identity.id() {
                    return Verdict::NotApplicable;
                }
                if !identity.is_admin() {
                    return Verdict::Deny(DenyReason::NotAdmin);
                }
                admin_flag_verdict(request)
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Authenticated => "any authenticated caller",
            Self::OwnsExisting => "stored uid matches caller",
            Self::OwnsProposed => "written uid matches caller",
            Self::SelfRegistration => "own document, written uid matches caller, isAdmin false",
            Self::OwnProfile => "own document, isAdmin unchanged",
            Self::AdminOverOthers => "admin caller on another document, isAdmin unchanged",
        }
    }
}

fn owner_verdict(uid: Option<&str>, identity: &Identity) -> Verdict {
    if uid == Some(identity.id()) {
        Verdict::Allow
    } else {
        Verdict::Deny(DenyReason::NotOwner)
    }
}

fn admin_flag_verdict(request: &AccessRequest<'_>) -> Verdict {
    let Some(existing) = request.existing else {
        return Verdict::Deny(DenyReason::MissingDocument);
    };
    let before = effective_admin(Some(existing));
    let after = effective_admin(request.proposed);
    match (before, after) {
        (Some(before), Some(after)) if before == after => Verdict::Allow,
        _ => Verdict::Deny(DenyReason::AdminFlagLocked),
    }
}

/// A single rule: collection + operations + predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub name: String,
    pub collection: Collection,
    pub operations: Vec<Operation>,
    pub predicate: Predicate,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        collection: Collection,
        operations: &[Operation],
        predicate: Predicate,
    ) -> Self {
        Self {
            name: name.into(),
            collection,
            operations: operations.to_vec(),
            predicate,
        }
    }

    /// Whether the rule targets this collection and operation.
    pub fn targets(&self, collection: &Collection, operation: Operation) -> bool {
        self.collection == *collection && self.operations.contains(&operation)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operations: Vec<&str> = self.operations.iter().map(Operation::as_str).collect();
        write!(
            f,
            "{:<24} {:<8} {:<22} {}",
            self.name,
            self.collection,
            operations.join(","),
            self.predicate.description()
        )
    }
}

static DEFAULT_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::builder()
        .rule(Rule::new(
            "todos.owner_access",
            Collection::Todos,
            &[Operation::Read, Operation::Update, Operation::Delete],
            Predicate::OwnsExisting,
        ))
        .rule(Rule::new(
            "todos.owner_create",
            Collection::Todos,
            &[Operation::Create],
            Predicate::OwnsProposed,
        ))
        .rule(Rule::new(
            "users.read",
            Collection::Users,
            &[Operation::Read],
            Predicate::Authenticated,
        ))
        .rule(Rule::new(
            "users.self_registration",
            Collection::Users,
            &[Operation::Create],
            Predicate::SelfRegistration,
        ))
        .rule(Rule::new(
            "users.own_profile",
            Collection::Users,
            &[Operation::Update],
            Predicate::OwnProfile,
        ))
        .rule(Rule::new(
            "users.admin_update",
            Collection::Users,
            &[Operation::Update],
            Predicate::AdminOverOthers,
        ))
        .build()
});

/// Shared instance of [`RuleSet::todo_app`].
pub fn default_rules() -> &'static RuleSet {
    &DEFAULT_RULES
}

/// Ordered list of rules with default-deny fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// The todo/profile application policy.
    pub fn todo_app() -> Self {
        DEFAULT_RULES.clone()
    }

    /// No rules: every request is denied.
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Rules targeting a collection and operation, in evaluation order.
    pub fn matching<'a>(
        &'a self,
        collection: &'a Collection,
        operation: Operation,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.targets(collection, operation))
    }
}

/// Builder for [`RuleSet`].
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<Rule>,
}

impl RuleSetBuilder {
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> RuleSet {
        RuleSet { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::Document, types::DocumentPath};
    use serde_json::json;

    fn identity(id: &str) -> Identity {
        Identity::new(id).unwrap()
    }

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_default_rules_cover_known_collections_only() {
        let rules = RuleSet::todo_app();
        assert_eq!(rules.len(), 6);
        assert!(rules.get("users.admin_update").is_some());

        let other = Collection::parse("test_documents");
        for operation in Operation::ALL {
            assert_eq!(rules.matching(&other, operation).count(), 0);
        }
        assert_eq!(rules.matching(&Collection::Users, Operation::Delete).count(), 0);
        assert_eq!(rules.matching(&Collection::Users, Operation::Update).count(), 2);
    }

    #[test]
    fn test_own_profile_not_applicable_elsewhere() {
        let caller = identity("user_abc");
        let path = DocumentPath::parse("users/user_xyz").unwrap();
        let request = AccessRequest::new(Some(&caller), Operation::Update, &path);

        assert_eq!(
            Predicate::OwnProfile.evaluate(&caller, &request),
            Verdict::NotApplicable
        );
        assert_eq!(
            Predicate::AdminOverOthers.evaluate(&caller, &request),
            Verdict::Deny(DenyReason::NotAdmin)
        );
    }

    #[test]
    fn test_self_registration_rejects_admin_grant() {
        let caller = identity("user_abc");
        let path = DocumentPath::parse("users/user_abc").unwrap();
        let proposed = doc(json!({"displayName": "A", "uid": "user_abc", "isAdmin": true}));
        let request = AccessRequest::new(Some(&caller), Operation::Create, &path)
            .with_proposed(Some(&proposed));

        assert_eq!(
            Predicate::SelfRegistration.evaluate(&caller, &request),
            Verdict::Deny(DenyReason::AdminFlagLocked)
        );
    }

    #[test]
    fn test_self_registration_requires_own_document() {
        let caller = identity("user_abc");
        let path = DocumentPath::parse("users/user_xyz").unwrap();
        let proposed = doc(json!({"displayName": "A", "uid": "user_abc", "isAdmin": false}));
        let request = AccessRequest::new(Some(&caller), Operation::Create, &path)
            .with_proposed(Some(&proposed));

        assert_eq!(
            Predicate::SelfRegistration.evaluate(&caller, &request),
            Verdict::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn test_malformed_admin_flag_is_never_unchanged() {
        let caller = identity("user_abc");
        let path = DocumentPath::parse("users/user_abc").unwrap();
        let existing = doc(json!({"uid": "user_abc", "isAdmin": "no"}));
        let proposed = existing.clone();
        let request = AccessRequest::new(Some(&caller), Operation::Update, &path)
            .with_existing(Some(&existing))
            .with_proposed(Some(&proposed));

        assert_eq!(
            Predicate::OwnProfile.evaluate(&caller, &request),
            Verdict::Deny(DenyReason::AdminFlagLocked)
        );
    }

    #[test]
    fn test_rule_display_lists_operations() {
        let rules = RuleSet::todo_app();
        let line = rules.get("todos.owner_access").unwrap().to_string();
        assert!(line.contains("read,update,delete"));
        assert!(line.contains("stored uid matches caller"));
    }
}
