use std::path::PathBuf;

use log::info;
use rayon::prelude::*;

use super::common::{load_catalog_file, load_policy_directory};
use super::model::{
    CompactionConfig, CompactionReport, CompactionResult, ADMIN_POLICY_FILE,
    DETAILED_ADMIN_POLICY_FILE, READ_ONLY_POLICY_FILE,
};
use crate::catalog::ServiceActionCatalog;
use crate::compaction::{DetailedPolicy, Engine};
use crate::errors::Result;
use crate::policy::Policy;
use crate::providers::{FileSystemProvider, JsonProvider};

/// Compact already-parsed policies
///
/// Each policy is detailed and minimized independently and in parallel; the
/// three combinations then run once over all partial results, in input order.
pub fn compact_policies(
    config: &CompactionConfig,
    catalog: &ServiceActionCatalog,
    policies: &[Policy],
) -> CompactionResult {
    info!("Compacting {} policies", policies.len());
    let engine = Engine::with_accumulator_sid(catalog, &config.accumulator_sid);

    let compact_admin = engine.combine_policies(policies, &config.admin_policy_name);

    let mapped: Vec<(DetailedPolicy, Option<Policy>)> = policies
        .par_iter()
        .map(|policy| {
            let detailed = engine.detail_policy(policy, &config.admin_policy_name);
            let minimized = engine.minimize_policy(&detailed.policy);
            (detailed, minimized)
        })
        .collect();

    let report = CompactionReport {
        issues: mapped
            .iter()
            .flat_map(|(detailed, _)| detailed.issues.iter().cloned())
            .collect(),
    };

    let detailed_admin = engine.combine_policies(
        mapped.iter().map(|(detailed, _)| &detailed.policy),
        &config.admin_policy_name,
    );

    let minimized: Vec<&Policy> = mapped
        .iter()
        .filter_map(|(_, minimized)| minimized.as_ref())
        .collect();
    let read_only = if minimized.is_empty() {
        info!("No read-only actions in any policy; skipping the read-only policy");
        None
    } else {
        Some(engine.combine_policies(minimized, &config.read_only_policy_name))
    };

    info!(
        "Compaction finished with {} unexpanded wildcards",
        report.len()
    );

    CompactionResult {
        compact_admin,
        detailed_admin,
        read_only,
        report,
    }
}

/// Load the catalog and every policy named by `config`, then compact them
///
/// The rayon work runs on tokio's blocking pool so it never stalls the
/// async workers.
pub async fn compact_policy_directory(config: &CompactionConfig) -> Result<CompactionResult> {
    let catalog = load_catalog_file(&config.catalog_path).await?;
    let policies: Vec<Policy> = load_policy_directory(&config.input_dir)
        .await?
        .into_iter()
        .map(|(_, policy)| policy)
        .collect();

    let config = config.clone();
    let result = tokio::task::spawn_blocking(move || {
        compact_policies(&config, &catalog, &policies)
    })
    .await?;
    Ok(result)
}

/// Write a result as pretty IAM policy JSON files
///
/// The read-only file is only written when a read-only policy exists.
/// Returns the paths written.
pub async fn write_compaction_result(
    result: &CompactionResult,
    config: &CompactionConfig,
) -> Result<Vec<PathBuf>> {
    let mut outputs = vec![
        (ADMIN_POLICY_FILE, &result.compact_admin),
        (DETAILED_ADMIN_POLICY_FILE, &result.detailed_admin),
    ];
    if let Some(read_only) = &result.read_only {
        outputs.push((READ_ONLY_POLICY_FILE, read_only));
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (file_name, policy) in outputs {
        let path = config.output_dir.join(file_name);
        FileSystemProvider::write_file(&path, &JsonProvider::stringify_policy(policy)?).await?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
