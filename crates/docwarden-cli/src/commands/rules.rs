//! Rules command implementation.

use clap::Parser;
use docwarden_rules::{Rule, RuleSet};
use serde::Serialize;

use crate::cli::{CommandContext, Outcome};
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Print the default rule table
#[derive(Debug, Parser)]
pub struct RulesCommand {
    /// Only show rules for this collection
    #[arg(long)]
    pub collection: Option<String>,
}

/// Rule table printed by `rules`.
#[derive(Debug, Serialize)]
pub struct RulesReport {
    pub project_id: String,
    pub rules: Vec<Rule>,
}

impl FormattedOutput for RulesReport {
    fn format_text(&self) -> String {
        let mut out = format!(
            "{:<24} {:<8} {:<22} {}\n",
            "RULE", "TARGET", "OPERATIONS", "CONDITION"
        );
        for rule in &self.rules {
            out.push_str(&rule.to_string());
            out.push('\n');
        }
        out.push_str("(everything else is denied)");
        out
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl RulesCommand {
    pub fn report(&self, project_id: &str, rules: &RuleSet) -> RulesReport {
        let rules = rules
            .rules()
            .iter()
            .filter(|rule| {
                self.collection
                    .as_deref()
                    .map_or(true, |name| rule.collection.as_str() == name)
            })
            .cloned()
            .collect();
        RulesReport {
            project_id: project_id.to_string(),
            rules,
        }
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<Outcome, CliError> {
        let report = self.report(&ctx.config.emulator.project_id, &RuleSet::todo_app());
        if !ctx.quiet {
            print_output(ctx, &report)?;
        }
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_table() {
        let report = RulesCommand { collection: None }.report("emulator-rules", &RuleSet::todo_app());
        assert_eq!(report.rules.len(), 6);

        let text = report.format_text();
        assert!(text.starts_with("RULE"));
        assert!(text.contains("users.admin_update"));
        assert!(text.ends_with("(everything else is denied)"));
    }

    #[test]
    fn test_filter_by_collection() {
        let report = RulesCommand {
            collection: Some("todos".to_string()),
        }
        .report("emulator-rules", &RuleSet::todo_app());

        assert_eq!(report.rules.len(), 2);
        assert!(report.rules.iter().all(|rule| rule.name.starts_with("todos.")));

        let json: serde_json::Value = serde_json::from_str(&report.format_json().unwrap()).unwrap();
        assert_eq!(json["project_id"], "emulator-rules");
        assert_eq!(json["rules"][0]["name"], "todos.owner_access");
    }
}
