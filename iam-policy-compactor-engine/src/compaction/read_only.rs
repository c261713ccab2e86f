//! Read-only minimization
//!
//! An action counts as read-only when its name, ignoring case, carries one of
//! the descriptors `Read`, `View`, `Describe`, `List` or `Get` right after the
//! `prefix:` separator. This is a naming heuristic, not a catalog lookup.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::policy::{ActionIdentifier, Policy, Statement};

const READ_ONLY_DESCRIPTORS: [&str; 5] = ["Read", "View", "Describe", "List", "Get"];

fn read_only_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!("(?i):(?:{})", READ_ONLY_DESCRIPTORS.join("|"));
        Regex::new(&pattern).expect("read-only descriptor pattern is a valid regex")
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyFilter;

impl ReadOnlyFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn is_read_only(&self, action: &ActionIdentifier) -> bool {
        read_only_pattern().is_match(action.as_str())
    }

    /// Keep only the read-only actions of a statement
    ///
    /// Returns `None` when nothing is left.
    pub fn minimize_statement(&self, statement: &Statement) -> Option<Statement> {
        let actions: BTreeSet<ActionIdentifier> = statement
            .actions
            .iter()
            .filter(|action| self.is_read_only(action))
            .cloned()
            .collect();

        if actions.is_empty() {
            debug!(
                "Dropping statement {} with no read-only actions",
                statement.sid.as_deref().unwrap_or("<no sid>")
            );
            return None;
        }

        Some(Statement {
            actions,
            ..statement.clone()
        })
    }

    /// Minimize a policy to its read-only actions
    ///
    /// Returns `None` when every statement is dropped; no read-only policy is
    /// representable in that case.
    pub fn minimize(&self, policy: &Policy) -> Option<Policy> {
        let statements: Vec<Statement> = policy
            .statements
            .iter()
            .filter_map(|statement| self.minimize_statement(statement))
            .collect();

        if statements.is_empty() {
            return None;
        }

        Some(Policy {
            statements,
            ..policy.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("s3:GetObject", true)]
    #[case("s3:ListBucket", true)]
    #[case("ec2:DescribeInstances", true)]
    #[case("logs:ReadLogEvents", true)]
    #[case("quicksight:ViewDashboard", true)]
    #[case("s3:getobject", true)]
    #[case("S3:LISTBUCKET", true)]
    #[case("s3:PutObject", false)]
    #[case("iam:PassRole", false)]
    #[case("ec2:RunInstances", false)]
    #[case("getter:PutThing", false)]
    #[case("GetObject", false)]
    fn test_is_read_only(#[case] action: &str, #[case] expected: bool) {
        assert_eq!(ReadOnlyFilter::new().is_read_only(&action.into()), expected);
    }

    fn statement(sid: &str, actions: &[&str]) -> Statement {
        Statement::allow(
            actions.iter().map(|a| ActionIdentifier::from(*a)),
            vec!["*".to_string()],
        )
        .with_sid(sid)
    }

    #[test]
    fn test_minimize_drops_mutating_actions_and_empty_statements() {
        let policy = Policy {
            id: Some("Detailed".to_string()),
            version: "2012-10-17".to_string(),
            statements: vec![
                statement("Mixed", &["s3:GetObject", "s3:PutObject", "s3:ListBucket"]),
                statement("Writes", &["iam:PassRole", "iam:CreateRole"]),
                statement("Reads", &["ec2:DescribeTags"]),
            ],
        };

        let minimized = ReadOnlyFilter::new().minimize(&policy).unwrap();

        assert_eq!(minimized.id.as_deref(), Some("Detailed"));
        let sids: Vec<_> = minimized
            .statements
            .iter()
            .map(|s| s.sid.as_deref().unwrap())
            .collect();
        assert_eq!(sids, vec!["Mixed", "Reads"]);

        let mixed: Vec<_> = minimized.statements[0]
            .actions
            .iter()
            .map(ActionIdentifier::as_str)
            .collect();
        assert_eq!(mixed, vec!["s3:GetObject", "s3:ListBucket"]);
    }

    #[test]
    fn test_minimize_all_mutating_is_absent() {
        let policy = Policy {
            id: Some("Writes".to_string()),
            version: "2012-10-17".to_string(),
            statements: vec![statement("Only", &["s3:PutObject", "ec2:RunInstances"])],
        };

        assert!(ReadOnlyFilter::new().minimize(&policy).is_none());
    }
}
