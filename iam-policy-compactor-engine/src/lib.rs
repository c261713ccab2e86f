//! This crate provides the core of the IAM policy compactor:
//! - a service action catalog built from the policy-generator service map
//! - wildcard action expansion against that catalog
//! - statement expansion, policy merging and re-collapsing
//! - read-only minimization
//! - a batch API over a directory of policy files
//!

pub mod api;
mod catalog;
mod compaction;
mod errors;
mod expansion;
pub mod policy;
mod providers;

// Re-exports for a small, focused public API
pub use catalog::{load_catalog, PrefixMapping, ServiceActionCatalog, ServiceActionEntry};
pub use compaction::{
    DetailedPolicy, Engine, PolicyCombiner, ReadOnlyFilter, StatementExpansion, StatementIssue,
    StatementTransformer, TransformedStatement,
};
pub use errors::{CompactorError, Result};
pub use expansion::{ActionExpander, ExpansionError};
pub use policy::{ActionIdentifier, ActionPattern, Condition, Effect, Policy, Statement};
pub use providers::{FileSystemProvider, JsonProvider};
