//! Authorization audit logging.

use crate::{
    decision::{AccessRequest, Decision, DenyReason},
    types::Operation,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Authorization audit event.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzAuditEvent {
    pub timestamp: DateTime<Utc>,
    pub identity_id: Option<String>,
    pub identity_email: Option<String>,
    pub operation: Operation,
    pub path: String,
    pub granted: bool,
    pub rule: Option<String>,
    pub reason: Option<DenyReason>,
}

impl AuthzAuditEvent {
    pub fn new(request: &AccessRequest<'_>, decision: &Decision) -> Self {
        Self {
            timestamp: Utc::now(),
            identity_id: request.identity.map(|identity| identity.id().to_string()),
            identity_email: request
                .identity
                .and_then(|identity| identity.email())
                .map(String::from),
            operation: request.operation,
            path: request.path.to_string(),
            granted: decision.is_allow(),
            rule: decision.rule().map(String::from),
            reason: decision.reason(),
        }
    }

    pub fn log(&self) {
        if self.granted {
            info!(
                event = "authz_granted",
                identity_id = ?self.identity_id,
                operation = %self.operation,
                path = %self.path,
                rule = ?self.rule,
                "Authorization granted"
            );
        } else {
            info!(
                event = "authz_denied",
                identity_id = ?self.identity_id,
                operation = %self.operation,
                path = %self.path,
                reason = ?self.reason.map(|reason| reason.code()),
                "Authorization denied"
            );
        }
    }
}

/// Log an authorization decision.
pub fn log_authz(request: &AccessRequest<'_>, decision: &Decision) {
    AuthzAuditEvent::new(request, decision).log();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentPath, Identity};

    #[test]
    fn test_event_captures_denial() {
        let caller = Identity::new("user_abc").unwrap().with_email("abc@gmail.com");
        let path = DocumentPath::parse("todos/form123").unwrap();
        let request = AccessRequest::new(Some(&caller), Operation::Delete, &path);
        let event = AuthzAuditEvent::new(&request, &Decision::deny(DenyReason::NotOwner));

        assert_eq!(event.identity_id.as_deref(), Some("user_abc"));
        assert_eq!(event.identity_email.as_deref(), Some("abc@gmail.com"));
        assert_eq!(event.path, "todos/form123");
        assert!(!event.granted);
        assert_eq!(event.reason, Some(DenyReason::NotOwner));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["operation"], "delete");
        assert_eq!(json["reason"], "not_owner");
    }

    #[test]
    fn test_event_for_anonymous_caller() {
        let path = DocumentPath::parse("users/user_abc").unwrap();
        let request = AccessRequest::new(None, Operation::Read, &path);
        let event = AuthzAuditEvent::new(&request, &Decision::deny(DenyReason::Unauthenticated));

        assert!(event.identity_id.is_none());
        event.log();
    }
}
