//! Statement expansion and accumulator folding
//!
//! Every statement's actions are expanded through the [`ActionExpander`].
//! Unconditional allow-all statements are folded into the accumulator
//! statement; all other statements survive with their expanded action set.

use std::collections::BTreeSet;

use log::warn;

use crate::expansion::{ActionExpander, ExpansionError};
use crate::policy::{ActionIdentifier, Effect, Policy, Statement};

/// Result of expanding one statement's action set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementExpansion {
    /// Union of every action's expansion; concrete actions included as-is
    pub detail_actions: BTreeSet<ActionIdentifier>,
    /// The wildcard identifiers that were replaced
    pub removed_wildcards: BTreeSet<ActionIdentifier>,
    /// Wildcards that contributed nothing
    pub issues: Vec<ExpansionError>,
}

/// Where a transformed statement ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformedStatement {
    /// Actions destined for the accumulator statement
    Folded(BTreeSet<ActionIdentifier>),
    /// A standalone statement with its actions expanded
    Kept(Statement),
}

/// A non-fatal expansion problem and the statement it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementIssue {
    pub policy_id: Option<String>,
    pub statement_sid: Option<String>,
    pub error: ExpansionError,
}

/// A policy in detailed form plus what could not be expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedPolicy {
    pub policy: Policy,
    pub issues: Vec<StatementIssue>,
}

#[derive(Debug, Clone)]
pub struct StatementTransformer<'a> {
    expander: ActionExpander<'a>,
    accumulator_sid: String,
}

impl<'a> StatementTransformer<'a> {
    pub fn new(expander: ActionExpander<'a>, accumulator_sid: impl Into<String>) -> Self {
        Self {
            expander,
            accumulator_sid: accumulator_sid.into(),
        }
    }

    /// Expand every action of a set
    pub fn expand_actions(&self, actions: &BTreeSet<ActionIdentifier>) -> StatementExpansion {
        let mut expansion = StatementExpansion::default();
        for action in actions {
            if action.is_wildcard() {
                expansion.removed_wildcards.insert(action.clone());
            }
            match self.expander.expand(action) {
                Ok(expanded) => expansion.detail_actions.extend(expanded),
                Err(error) => expansion.issues.push(error),
            }
        }
        expansion
    }

    /// Expand one statement and decide whether it folds into the accumulator
    pub fn transform_statement(
        &self,
        statement: &Statement,
    ) -> (TransformedStatement, Vec<ExpansionError>) {
        let StatementExpansion {
            detail_actions,
            removed_wildcards,
            issues,
        } = self.expand_actions(&statement.actions);

        if statement.is_unconditional_allow_all() {
            if statement.effect == Effect::Deny {
                warn!(
                    "Deny statement {} covers every resource without conditions; its actions are folded into the allow accumulator",
                    statement.sid.as_deref().unwrap_or("<no sid>")
                );
            }
            return (TransformedStatement::Folded(detail_actions), issues);
        }

        let remaining: BTreeSet<ActionIdentifier> = statement
            .actions
            .difference(&removed_wildcards)
            .cloned()
            .collect();
        let actions: BTreeSet<ActionIdentifier> =
            remaining.union(&detail_actions).cloned().collect();

        if actions.is_empty() {
            warn!(
                "Statement {} has no actions left after expansion",
                statement.sid.as_deref().unwrap_or("<no sid>")
            );
        }

        let kept = Statement {
            actions,
            ..statement.clone()
        };
        (TransformedStatement::Kept(kept), issues)
    }

    /// Build the detailed form of a policy
    ///
    /// The result starts with the accumulator statement holding every folded
    /// action, followed by the surviving statements in their original order.
    pub fn detail_policy(&self, policy: &Policy, policy_name: &str) -> DetailedPolicy {
        let mut detailed = Policy::base(policy_name, &self.accumulator_sid);
        let mut folded = BTreeSet::new();
        let mut issues = Vec::new();

        for statement in &policy.statements {
            let (transformed, errors) = self.transform_statement(statement);
            for error in errors {
                warn!(
                    "{}: dropping {}",
                    policy.id.as_deref().unwrap_or(policy_name),
                    error
                );
                issues.push(StatementIssue {
                    policy_id: policy.id.clone(),
                    statement_sid: statement.sid.clone(),
                    error,
                });
            }
            match transformed {
                TransformedStatement::Folded(actions) => folded.extend(actions),
                TransformedStatement::Kept(kept) => detailed.statements.push(kept),
            }
        }

        detailed.statements[0].actions = folded;
        DetailedPolicy {
            policy: detailed,
            issues,
        }
    }
}
