//! Authorization decision engine.

use crate::{
    audit::log_authz,
    decision::{AccessRequest, Decision, DenyReason},
    document::Document,
    policy::{default_rules, RuleSet, Verdict},
    types::{DocumentPath, Identity, Operation},
};
use std::sync::Arc;

/// Evaluate a request against a rule set.
///
/// Anonymous callers are denied outright. Otherwise the first targeted rule
/// whose predicate allows wins; if none does, the first recorded denial is
/// reported, or [`DenyReason::NoMatchingRule`] when no rule applied at all.
pub fn evaluate(rules: &RuleSet, request: &AccessRequest<'_>) -> Decision {
    let Some(identity) = request.identity else {
        return Decision::deny(DenyReason::Unauthenticated);
    };

    let mut denial = None;
    for rule in rules.matching(request.path.collection(), request.operation) {
        match rule.predicate.evaluate(identity, request) {
            Verdict::Allow => return Decision::allow(rule.name.clone()),
            Verdict::Deny(reason) => {
                denial.get_or_insert(reason);
            }
            Verdict::NotApplicable => {}
        }
    }

    Decision::deny(denial.unwrap_or(DenyReason::NoMatchingRule))
}

/// Decide a single operation under the todo/profile application policy.
pub fn decide(
    identity: Option<&Identity>,
    operation: Operation,
    path: &DocumentPath,
    existing: Option<&Document>,
    proposed: Option<&Document>,
) -> Decision {
    let request = AccessRequest::new(identity, operation, path)
        .with_existing(existing)
        .with_proposed(proposed);
    evaluate(default_rules(), &request)
}

/// Rule set plus audit settings, shared between callers.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: Arc<RuleSet>,
    audit: bool,
}

impl PolicyEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
            audit: true,
        }
    }

    /// Enable or disable decision audit events.
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn audit_enabled(&self) -> bool {
        self.audit
    }

    pub fn evaluate(&self, request: &AccessRequest<'_>) -> Decision {
        let decision = evaluate(&self.rules, request);
        if self.audit {
            log_authz(request, &decision);
        }
        decision
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(RuleSet::todo_app())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Predicate, Rule};
    use crate::types::Collection;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_anonymous_is_denied_before_rules() {
        let path = DocumentPath::parse("users/user_abc").unwrap();
        let decision = decide(None, Operation::Read, &path, None, None);
        assert_eq!(decision.reason(), Some(DenyReason::Unauthenticated));
    }

    #[test]
    fn test_first_allowing_rule_wins() {
        let rules = RuleSet::builder()
            .rule(Rule::new("first", Collection::Todos, &[Operation::Read], Predicate::OwnsExisting))
            .rule(Rule::new("second", Collection::Todos, &[Operation::Read], Predicate::Authenticated))
            .rule(Rule::new("third", Collection::Todos, &[Operation::Read], Predicate::Authenticated))
            .build();
        let caller = Identity::new("user_abc").unwrap();
        let path = DocumentPath::parse("todos/form123").unwrap();
        let existing = doc(json!({"name": "Learn to fly", "uid": "user_xyz"}));
        let request = AccessRequest::new(Some(&caller), Operation::Read, &path)
            .with_existing(Some(&existing));

        assert_eq!(evaluate(&rules, &request).rule(), Some("second"));
    }

    #[test]
    fn test_deny_all_reports_no_matching_rule() {
        let engine = PolicyEngine::new(RuleSet::deny_all()).with_audit(false);
        let caller = Identity::new("user_abc").unwrap();
        let path = DocumentPath::parse("users/user_abc").unwrap();
        let request = AccessRequest::new(Some(&caller), Operation::Read, &path);

        assert_eq!(engine.evaluate(&request).reason(), Some(DenyReason::NoMatchingRule));
        assert!(!engine.audit_enabled());
    }

    #[test]
    fn test_denial_reason_comes_from_applicable_rule() {
        let caller = Identity::new("user_abc").unwrap();
        let path = DocumentPath::parse("users/user_xyz").unwrap();
        let existing = doc(json!({"displayName": "X", "uid": "user_xyz", "isAdmin": false}));
        let proposed = existing.merged(&doc(json!({"displayName": "Sarah Adams"})));

        let decision = decide(
            Some(&caller),
            Operation::Update,
            &path,
            Some(&existing),
            Some(&proposed),
        );
        assert_eq!(decision.reason(), Some(DenyReason::NotAdmin));
    }
}
