use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use iam_policy_compactor_engine::api::model::CompactionConfig;
use iam_policy_compactor_engine::api::{
    compact_policy_directory, load_catalog_file, write_compaction_result,
};
use iam_policy_compactor_engine::{
    Engine, FileSystemProvider, JsonProvider, Policy, ServiceActionCatalog,
};
use log::warn;

use crate::{SharedArgs, EXIT_NO_READ_ONLY_POLICY};

pub async fn compact(
    shared: &SharedArgs,
    policies_dir: PathBuf,
    output_dir: PathBuf,
) -> Result<ExitCode> {
    let config = CompactionConfig {
        input_dir: policies_dir,
        catalog_path: shared.catalog.clone(),
        output_dir,
        admin_policy_name: shared.admin_policy_name.clone(),
        read_only_policy_name: shared.read_only_policy_name.clone(),
        accumulator_sid: shared.accumulator_sid.clone(),
    };

    let result = compact_policy_directory(&config).await.with_context(|| {
        format!(
            "Failed to compact policies in {}",
            config.input_dir.display()
        )
    })?;

    if !result.report.is_empty() {
        warn!(
            "{} wildcard actions could not be expanded and were dropped",
            result.report.len()
        );
    }
    if result.read_only.is_none() {
        eprintln!("No read-only actions found; readonlyPolicy.json was not written");
    }

    let written = write_compaction_result(&result, &config)
        .await
        .context("Failed to write compacted policies")?;
    for path in written {
        println!("{}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

pub async fn expand(shared: &SharedArgs, file: &Path) -> Result<ExitCode> {
    let catalog = load_catalog(&shared.catalog).await?;
    let policy = load_policy_file(file).await?;
    let engine = Engine::with_accumulator_sid(&catalog, &shared.accumulator_sid);

    let detailed = engine.detail_policy(&policy, &shared.admin_policy_name);
    print_policy(&detailed.policy)?;
    Ok(ExitCode::SUCCESS)
}

pub async fn read_only(shared: &SharedArgs, file: &Path) -> Result<ExitCode> {
    let catalog = load_catalog(&shared.catalog).await?;
    let policy = load_policy_file(file).await?;
    let engine = Engine::with_accumulator_sid(&catalog, &shared.accumulator_sid);

    match engine.read_only_policy(&policy, &shared.read_only_policy_name) {
        (Some(minimized), _) => {
            print_policy(&minimized)?;
            Ok(ExitCode::SUCCESS)
        }
        (None, _) => {
            eprintln!("{} has no read-only actions", file.display());
            Ok(ExitCode::from(EXIT_NO_READ_ONLY_POLICY))
        }
    }
}

async fn load_catalog(path: &Path) -> Result<ServiceActionCatalog> {
    load_catalog_file(path)
        .await
        .with_context(|| format!("Failed to load the service catalog {}", path.display()))
}

async fn load_policy_file(path: &Path) -> Result<Policy> {
    let content = FileSystemProvider::read_file(path)
        .await
        .context("Failed to read the policy")?;
    JsonProvider::parse_policy(&content)
        .with_context(|| format!("Invalid policy document {}", path.display()))
}

fn print_policy(policy: &Policy) -> Result<()> {
    let json = JsonProvider::stringify_policy(policy).context("Failed to serialize the policy")?;
    println!("{}", json);
    Ok(())
}
