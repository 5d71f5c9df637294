//! Check command implementation.

use anyhow::Context;
use clap::Parser;
use docwarden_rules::{
    AccessRequest, Decision, Document, DocumentPath, Identity, Operation, PolicyEngine, RoleFlags,
    RuleSet,
};
use serde::Serialize;

use crate::cli::{CommandContext, Outcome};
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Decide a single operation against the default rules
#[derive(Debug, Parser)]
pub struct CheckCommand {
    /// Caller identity id; omit for an anonymous caller
    #[arg(long)]
    pub uid: Option<String>,

    /// Caller email, recorded in audit output
    #[arg(long, requires = "uid")]
    pub email: Option<String>,

    /// Caller token carries isAdmin: true
    #[arg(long, requires = "uid")]
    pub admin: bool,

    /// Operation (read, create, update, delete)
    #[arg(long, value_parser = parse_operation)]
    pub op: Operation,

    /// Target document as collection/id
    #[arg(long)]
    pub path: String,

    /// Stored document as a JSON object
    #[arg(long)]
    pub existing: Option<String>,

    /// Document after the write as a JSON object
    #[arg(long)]
    pub proposed: Option<String>,

    /// Treat --proposed as a patch merged onto --existing
    #[arg(long, requires = "proposed")]
    pub merge: bool,
}

fn parse_operation(raw: &str) -> Result<Operation, String> {
    Operation::parse(raw).ok_or_else(|| format!("unknown operation: {raw}"))
}

fn parse_document(flag: &str, raw: Option<&str>) -> Result<Option<Document>, CliError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("--{flag} is not valid JSON"))?;
    let document = Document::from_value(value).with_context(|| format!("--{flag} rejected"))?;
    Ok(Some(document))
}

/// Decision report printed by `check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub uid: Option<String>,
    pub operation: Operation,
    pub path: String,
    #[serde(flatten)]
    pub decision: Decision,
}

impl FormattedOutput for CheckReport {
    fn format_text(&self) -> String {
        match self.decision.reason() {
            Some(reason) => format!("{}: {}", self.decision, reason.description()),
            None => self.decision.to_string(),
        }
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl CheckCommand {
    fn identity(&self) -> Result<Option<Identity>, CliError> {
        let Some(uid) = &self.uid else {
            return Ok(None);
        };
        let mut identity = Identity::new(uid.as_str())
            .map_err(|e| CliError::invalid_arg("uid", e.to_string()))?;
        if let Some(email) = &self.email {
            identity = identity.with_email(email.as_str());
        }
        if self.admin {
            identity = identity.with_role_flags(RoleFlags::admin());
        }
        Ok(Some(identity))
    }

    /// Evaluate the request and report the decision.
    pub fn run(&self, engine: &PolicyEngine) -> Result<CheckReport, CliError> {
        let identity = self.identity()?;
        let path = DocumentPath::parse(&self.path)
            .map_err(|e| CliError::invalid_arg("path", e.to_string()))?;
        let existing = parse_document("existing", self.existing.as_deref())?;
        let mut proposed = parse_document("proposed", self.proposed.as_deref())?;
        if self.merge {
            if let (Some(existing), Some(patch)) = (&existing, &proposed) {
                proposed = Some(existing.merged(patch));
            }
        }

        let request = AccessRequest::new(identity.as_ref(), self.op, &path)
            .with_existing(existing.as_ref())
            .with_proposed(proposed.as_ref());
        let decision = engine.evaluate(&request);

        Ok(CheckReport {
            uid: self.uid.clone(),
            operation: self.op,
            path: path.to_string(),
            decision,
        })
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<Outcome, CliError> {
        let engine = PolicyEngine::new(RuleSet::todo_app()).with_audit(ctx.config.audit.log_decisions);
        let report = self.run(&engine)?;
        if !ctx.quiet {
            print_output(ctx, &report)?;
        }
        Ok(if report.decision.is_allow() {
            Outcome::Allowed
        } else {
            Outcome::Denied
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwarden_rules::DenyReason;

    fn command(args: &[&str]) -> CheckCommand {
        let mut argv = vec!["check"];
        argv.extend_from_slice(args);
        CheckCommand::try_parse_from(argv).unwrap()
    }

    fn engine() -> PolicyEngine {
        PolicyEngine::default().with_audit(false)
    }

    #[test]
    fn test_owner_reads_todo() {
        let report = command(&[
            "--uid", "user_abc", "--op", "read", "--path", "todos/form123",
            "--existing", r#"{"name":"Learn to fly","uid":"user_abc"}"#,
        ])
        .run(&engine())
        .unwrap();

        assert!(report.decision.is_allow());
        assert_eq!(report.decision.rule(), Some("todos.owner_access"));
        assert_eq!(report.format_text(), "ALLOW (todos.owner_access)");
    }

    #[test]
    fn test_anonymous_is_denied() {
        let report = command(&["--op", "get", "--path", "users/user_abc"])
            .run(&engine())
            .unwrap();
        assert_eq!(report.decision.reason(), Some(DenyReason::Unauthenticated));
        assert!(report.uid.is_none());
    }

    #[test]
    fn test_merge_builds_resulting_document() {
        let args = [
            "--uid", "user_abc", "--op", "update", "--path", "users/user_abc",
            "--existing", r#"{"displayName":"Dominic Steve","uid":"user_abc","isAdmin":true}"#,
            "--proposed", r#"{"displayName":"Sarah Adams"}"#,
        ];

        // As a full replacement the flag disappears, which reads as a change.
        let replaced = command(&args).run(&engine()).unwrap();
        assert_eq!(replaced.decision.reason(), Some(DenyReason::AdminFlagLocked));

        let mut merge_args = args.to_vec();
        merge_args.push("--merge");
        let merged = command(&merge_args).run(&engine()).unwrap();
        assert!(merged.decision.is_allow());
    }

    #[test]
    fn test_admin_flag_on_token() {
        let report = command(&[
            "--uid", "user_abc", "--admin", "--op", "update", "--path", "users/user_xyz",
            "--existing", r#"{"uid":"user_xyz","isAdmin":false}"#,
            "--proposed", r#"{"displayName":"Sarah Adams","uid":"user_xyz","isAdmin":false}"#,
        ])
        .run(&engine())
        .unwrap();
        assert_eq!(report.decision.rule(), Some("users.admin_update"));
    }

    #[test]
    fn test_bad_input_is_rejected() {
        let bad_path = command(&["--uid", "u", "--op", "read", "--path", "todos"]).run(&engine());
        assert_eq!(bad_path.unwrap_err().code(), "E004");

        let bad_json = command(&[
            "--uid", "u", "--op", "read", "--path", "todos/a", "--existing", "{nope",
        ])
        .run(&engine());
        assert_eq!(bad_json.unwrap_err().code(), "E999");

        let not_object = command(&[
            "--uid", "u", "--op", "read", "--path", "todos/a", "--existing", "[1,2]",
        ])
        .run(&engine());
        assert!(not_object.is_err());
    }

    #[test]
    fn test_json_report_shape() {
        let report = command(&[
            "--uid", "user_abc", "--op", "delete", "--path", "users/user_abc",
        ])
        .run(&engine())
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.format_json().unwrap()).unwrap();

        assert_eq!(json["effect"], "deny");
        assert_eq!(json["operation"], "delete");
        assert_eq!(json["path"], "users/user_abc");
        assert_eq!(json["uid"], "user_abc");
    }
}
