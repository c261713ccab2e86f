//! IAM policy JSON documents
//!
//! Serde shapes for the policy grammar as it appears on disk, and the
//! conversions between those shapes and the plain [`Policy`] model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ActionIdentifier, Condition, Effect, Policy, Statement, POLICY_VERSION};
use crate::errors::{CompactorError, Result};

/// A field that may hold one value or an array of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

type ConditionBlock = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub statement: OneOrMany<StatementDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_action: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_resource: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionBlock>,
}

impl TryFrom<PolicyDocument> for Policy {
    type Error = CompactorError;

    fn try_from(document: PolicyDocument) -> Result<Self> {
        let policy_id = document.id;
        let statements = document
            .statement
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(index, statement)| statement_from_document(policy_id.as_deref(), index, statement))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: policy_id,
            version: document.version.unwrap_or_else(|| POLICY_VERSION.to_string()),
            statements,
        })
    }
}

fn statement_from_document(
    policy_id: Option<&str>,
    index: usize,
    document: StatementDocument,
) -> Result<Statement> {
    let label = document
        .sid
        .clone()
        .unwrap_or_else(|| format!("#{}", index));
    let unsupported = |field: &str| {
        CompactorError::invalid_policy(
            policy_id,
            format!("statement {} uses unsupported element {}", label, field),
        )
    };

    if document.not_action.is_some() {
        return Err(unsupported("NotAction"));
    }
    if document.not_resource.is_some() {
        return Err(unsupported("NotResource"));
    }
    if document.principal.is_some() {
        return Err(unsupported("Principal"));
    }

    let actions = document
        .action
        .ok_or_else(|| {
            CompactorError::invalid_policy(policy_id, format!("statement {} has no Action", label))
        })?
        .into_vec()
        .into_iter()
        .map(ActionIdentifier::from)
        .collect();
    let resources = document
        .resource
        .ok_or_else(|| {
            CompactorError::invalid_policy(policy_id, format!("statement {} has no Resource", label))
        })?
        .into_vec();

    let conditions = document
        .condition
        .unwrap_or_default()
        .into_iter()
        .flat_map(|(operator, entries)| {
            entries.into_iter().map(move |(key, value)| Condition {
                operator: operator.clone(),
                key,
                value,
            })
        })
        .collect();

    Ok(Statement {
        sid: document.sid,
        effect: document.effect,
        actions,
        resources,
        conditions,
    })
}

impl From<&Policy> for PolicyDocument {
    fn from(policy: &Policy) -> Self {
        Self {
            version: Some(policy.version.clone()),
            id: policy.id.clone(),
            statement: OneOrMany::Many(policy.statements.iter().map(StatementDocument::from).collect()),
        }
    }
}

impl From<&Statement> for StatementDocument {
    fn from(statement: &Statement) -> Self {
        let condition = if statement.conditions.is_empty() {
            None
        } else {
            let mut block = ConditionBlock::new();
            for condition in &statement.conditions {
                block
                    .entry(condition.operator.clone())
                    .or_default()
                    .insert(condition.key.clone(), condition.value.clone());
            }
            Some(block)
        };

        Self {
            sid: statement.sid.clone(),
            effect: statement.effect,
            action: Some(OneOrMany::Many(
                statement.actions.iter().map(|a| a.as_str().to_string()).collect(),
            )),
            not_action: None,
            resource: Some(OneOrMany::Many(statement.resources.clone())),
            not_resource: None,
            principal: None,
            condition,
        }
    }
}
