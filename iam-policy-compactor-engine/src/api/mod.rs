//! Batch compaction API
//!
//! Runs the whole pipeline over a directory of policy files: load the
//! catalog, load and rename the policies, then build the compact admin,
//! detailed admin and read-only policies.

mod common;
mod compact;
pub mod model;

pub use common::load_catalog_file;
pub use compact::{compact_policies, compact_policy_directory, write_compaction_result};
