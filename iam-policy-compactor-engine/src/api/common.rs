use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::catalog::{load_catalog, ServiceActionCatalog};
use crate::errors::Result;
use crate::policy::Policy;
use crate::providers::{FileSystemProvider, JsonProvider};

const POLICY_EXTENSION: &str = "json";

/// Read and index the service catalog file
pub async fn load_catalog_file(path: &Path) -> Result<ServiceActionCatalog> {
    debug!("Loading catalog from {}", path.display());
    let content = FileSystemProvider::read_file(path).await?;
    load_catalog(&content)
}

/// Statement id prefix derived from a policy file name
///
/// The file stem with every non-alphanumeric character removed, so that
/// `sales-admin.json` yields `salesadmin`.
pub(crate) fn statement_sid_prefix(path: &Path) -> String {
    path.file_stem()
        .map(|stem| {
            stem.to_string_lossy()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect()
        })
        .unwrap_or_default()
}

/// Rename every statement to `{prefix}{index}`
pub(crate) fn rename_statements(policy: &mut Policy, prefix: &str) {
    for (index, statement) in policy.statements.iter_mut().enumerate() {
        statement.sid = Some(format!("{}{}", prefix, index));
    }
}

/// Parse every policy file in a directory, in file name order
pub(crate) async fn load_policy_directory(dir: &Path) -> Result<Vec<(PathBuf, Policy)>> {
    let files = FileSystemProvider::list_files_with_extension(dir, POLICY_EXTENSION).await?;
    if files.is_empty() {
        warn!("No policy files found in {}", dir.display());
    }

    let mut policies = Vec::with_capacity(files.len());
    for file in files {
        let content = FileSystemProvider::read_file(&file).await?;
        let mut policy = JsonProvider::parse_policy(&content)?;
        rename_statements(&mut policy, &statement_sid_prefix(&file));
        debug!(
            "Loaded {} with {} statements",
            file.display(),
            policy.statements.len()
        );
        policies.push((file, policy));
    }

    info!("Loaded {} policies from {}", policies.len(), dir.display());
    Ok(policies)
}
