//! Policy compaction
//!
//! Expansion of whole statements, merging of policies and read-only
//! minimization, tied together by [`Engine`].

mod combine;
mod engine;
mod read_only;
mod transform;

pub use combine::PolicyCombiner;
pub use engine::Engine;
pub use read_only::ReadOnlyFilter;
pub use transform::{
    DetailedPolicy, StatementExpansion, StatementIssue, StatementTransformer, TransformedStatement,
};
