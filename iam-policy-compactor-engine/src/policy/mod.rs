//! Plain policy data model
//!
//! Policies, statements and action identifiers as the compaction engine sees
//! them. The model is independent of any wire format; [`document`] adapts it
//! to and from IAM policy JSON.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod document;

pub use document::{OneOrMany, PolicyDocument, StatementDocument};

/// Policy language version stamped on every policy the engine produces
pub const POLICY_VERSION: &str = "2012-10-17";

/// Sid of the synthetic accumulator statement unless the caller overrides it
pub const DEFAULT_ACCUMULATOR_SID: &str = "GenericAllowedActions";

/// Resource identifier meaning "every resource"
pub const ALL_RESOURCES: &str = "*";

/// An IAM action name such as `s3:GetObject`, `s3:Get*` or `s3:*`
///
/// Identity, ordering and hashing use the exact string. Wildcard matching
/// against the catalog is case-insensitive and lives in the expander.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionIdentifier(String);

/// Parsed view of an [`ActionIdentifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPattern<'a> {
    /// No trailing `*`; denotes exactly itself
    Concrete,
    /// `prefix:*`
    FullService { prefix: &'a str },
    /// `prefix:Stem*`
    Descriptor { prefix: &'a str, stem: &'a str },
    /// A trailing `*` without a `prefix:` part, e.g. a bare `*`
    Unqualified,
}

impl ActionIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build `prefix:action`
    pub fn qualified(prefix: &str, action: &str) -> Self {
        Self(format!("{}:{}", prefix, action))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.ends_with('*')
    }

    /// The wire prefix before the first `:`, if any
    pub fn service_prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(prefix, _)| prefix)
    }

    /// The action part after the first `:`, if any
    pub fn action_part(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, name)| name)
    }

    /// Text between the first `:` and the first `*`
    ///
    /// Wildcards sharing this stem are candidates for collapsing into one
    /// another when policies are combined.
    pub fn collapse_stem(&self) -> Option<&str> {
        let name = self.action_part()?;
        Some(name.find('*').map_or(name, |star| &name[..star]))
    }

    pub fn pattern(&self) -> ActionPattern<'_> {
        if !self.is_wildcard() {
            return ActionPattern::Concrete;
        }
        match self.0.split_once(':') {
            Some((prefix, "*")) => ActionPattern::FullService { prefix },
            Some((prefix, rest)) => ActionPattern::Descriptor {
                prefix,
                stem: &rest[..rest.len() - 1],
            },
            None => ActionPattern::Unqualified,
        }
    }
}

impl fmt::Display for ActionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionIdentifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ActionIdentifier {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One condition entry: `{ operator: { key: value } }`
///
/// Conditions are opaque to the engine. They only decide whether a statement
/// may be folded into the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub operator: String,
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sid: Option<String>,
    pub effect: Effect,
    pub actions: BTreeSet<ActionIdentifier>,
    pub resources: Vec<String>,
    pub conditions: Vec<Condition>,
}

impl Statement {
    /// Create an Allow statement on the given resources
    pub fn allow(
        actions: impl IntoIterator<Item = ActionIdentifier>,
        resources: Vec<String>,
    ) -> Self {
        Self {
            sid: None,
            effect: Effect::Allow,
            actions: actions.into_iter().collect(),
            resources,
            conditions: Vec::new(),
        }
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Exactly one resource, `*`, and no conditions
    ///
    /// Statements of this shape are folded into the accumulator statement
    /// instead of surviving on their own. The effect is not consulted.
    pub fn is_unconditional_allow_all(&self) -> bool {
        self.resources.len() == 1 && self.resources[0] == ALL_RESOURCES && self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub id: Option<String>,
    pub version: String,
    pub statements: Vec<Statement>,
}

impl Policy {
    /// An empty policy holding only the accumulator statement
    pub fn base(policy_id: &str, accumulator_sid: &str) -> Self {
        Self {
            id: Some(policy_id.to_string()),
            version: POLICY_VERSION.to_string(),
            statements: vec![
                Statement::allow(Vec::new(), vec![ALL_RESOURCES.to_string()])
                    .with_sid(accumulator_sid),
            ],
        }
    }

    /// Every action name across all statements
    pub fn action_names(&self) -> impl Iterator<Item = &ActionIdentifier> {
        self.statements.iter().flat_map(|s| s.actions.iter())
    }
}
