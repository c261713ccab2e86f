//! Configuration and result types for a compaction run

use std::path::PathBuf;

use crate::compaction::StatementIssue;
use crate::policy::{Policy, DEFAULT_ACCUMULATOR_SID};

pub const DEFAULT_INPUT_DIR: &str = "./Policies";
pub const DEFAULT_CATALOG_PATH: &str = "./policies.json";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_ADMIN_POLICY_NAME: &str = "AdminPolicy";
pub const DEFAULT_READ_ONLY_POLICY_NAME: &str = "ReadOnlyPolicy";

/// File names written by [`write_compaction_result`](super::write_compaction_result)
pub const ADMIN_POLICY_FILE: &str = "adminPolicy.json";
pub const DETAILED_ADMIN_POLICY_FILE: &str = "adminLongPolicy.json";
pub const READ_ONLY_POLICY_FILE: &str = "readonlyPolicy.json";

/// Configuration for compacting a directory of policies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionConfig {
    /// Directory holding the `*.json` input policies
    pub input_dir: PathBuf,
    /// Service catalog JSON (`serviceMap` document)
    pub catalog_path: PathBuf,
    /// Where the output policies are written
    pub output_dir: PathBuf,
    /// Id of both admin policies
    pub admin_policy_name: String,
    /// Id of the read-only policy
    pub read_only_policy_name: String,
    /// Sid of the accumulator statement opening every output policy
    pub accumulator_sid: String,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            admin_policy_name: DEFAULT_ADMIN_POLICY_NAME.to_string(),
            read_only_policy_name: DEFAULT_READ_ONLY_POLICY_NAME.to_string(),
            accumulator_sid: DEFAULT_ACCUMULATOR_SID.to_string(),
        }
    }
}

/// Non-fatal problems met during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactionReport {
    pub issues: Vec<StatementIssue>,
}

impl CompactionReport {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

/// The three policies produced by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionResult {
    /// Combination of the policies as written
    pub compact_admin: Policy,
    /// Combination of the fully enumerated policies
    pub detailed_admin: Policy,
    /// Combination of the read-only minimizations; absent when none survive
    pub read_only: Option<Policy>,
    pub report: CompactionReport,
}
