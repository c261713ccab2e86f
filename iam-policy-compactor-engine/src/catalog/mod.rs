//! Service-action catalog
//!
//! An immutable index over the services known to the catalog: which bare
//! action names each wire prefix owns, and which display names map to each
//! wire prefix. Built once per run and shared read-only across all policies.

use std::collections::{BTreeSet, HashMap};

pub(crate) mod loader;

pub use loader::load_catalog;

/// One service of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceActionEntry {
    /// Human-readable name, e.g. "Amazon S3"
    pub service_name: String,
    /// Namespace token used in action names, e.g. "s3"
    pub wire_prefix: String,
    /// Bare action names without the prefix
    pub actions: BTreeSet<String>,
}

impl ServiceActionEntry {
    pub fn new(
        service_name: impl Into<String>,
        wire_prefix: impl Into<String>,
        actions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            wire_prefix: wire_prefix.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Display name to wire prefix mapping
///
/// Several display names may share one prefix when the catalog lists
/// service aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMapping {
    pub service_display_name: String,
    pub wire_prefix: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceActionCatalog {
    entries: Vec<ServiceActionEntry>,
    /// Lowercased wire prefix -> indices into `entries`
    entries_by_prefix: HashMap<String, Vec<usize>>,
    /// Exact wire prefix -> display names
    mappings_by_prefix: HashMap<String, Vec<PrefixMapping>>,
}

impl ServiceActionCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = ServiceActionEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            let index = catalog.entries.len();
            catalog
                .entries_by_prefix
                .entry(entry.wire_prefix.to_lowercase())
                .or_default()
                .push(index);
            catalog
                .mappings_by_prefix
                .entry(entry.wire_prefix.clone())
                .or_default()
                .push(PrefixMapping {
                    service_display_name: entry.service_name.clone(),
                    wire_prefix: entry.wire_prefix.clone(),
                });
            catalog.entries.push(entry);
        }
        catalog
    }

    /// Entries whose wire prefix equals `prefix`, ignoring case
    pub fn lookup_by_wire_prefix(&self, prefix: &str) -> Vec<&ServiceActionEntry> {
        self.entries_by_prefix
            .get(&prefix.to_lowercase())
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Display-name mappings whose wire prefix equals `prefix` exactly
    pub fn lookup_services_by_prefix(&self, prefix: &str) -> &[PrefixMapping] {
        self.mappings_by_prefix
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[ServiceActionEntry] {
        &self.entries
    }

    /// Number of services, counting aliases separately
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct wire prefixes, ignoring case
    pub fn prefix_count(&self) -> usize {
        self.entries_by_prefix.len()
    }
}
