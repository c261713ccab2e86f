//! Native JSON provider backed by `serde_json`.
//!
//! All parse failures are reported as [`CompactorError::Json`] carrying the
//! line and column of the problem.

use serde::{Deserialize, Serialize};

use crate::errors::{CompactorError, Result};
use crate::policy::{Policy, PolicyDocument};

/// Native JSON provider using `serde_json`.
///
/// Stateless; `Send + Sync`.
#[derive(Debug, Clone)]
pub struct NativeJsonProvider;

impl NativeJsonProvider {
    /// Parse JSON to a generic `serde_json::Value`.
    pub fn parse_to_value(json_str: &str) -> Result<serde_json::Value> {
        serde_json::from_str(json_str).map_err(CompactorError::from)
    }

    /// Parse JSON string into a typed value.
    pub fn parse<T>(json_str: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_json::from_str(json_str).map_err(CompactorError::from)
    }

    /// Parse an IAM policy document into the plain policy model.
    pub fn parse_policy(json_str: &str) -> Result<Policy> {
        let document: PolicyDocument = Self::parse(json_str)?;
        Policy::try_from(document)
    }

    /// Serialize a value to pretty-printed JSON.
    pub fn stringify_pretty<T>(value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        serde_json::to_string_pretty(value).map_err(CompactorError::from)
    }

    /// Serialize a policy as a pretty-printed IAM policy document.
    pub fn stringify_policy(policy: &Policy) -> Result<String> {
        Self::stringify_pretty(&PolicyDocument::from(policy))
    }
}
