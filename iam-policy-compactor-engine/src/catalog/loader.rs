//! Catalog construction from the policy-generator service map
//!
//! The catalog source is a JSON object with a top-level `serviceMap` whose
//! keys are service display names:
//!
//! ```json
//! { "serviceMap": { "Amazon S3": { "StringPrefix": "s3", "Actions": ["GetObject"] } } }
//! ```
//!
//! Everything else in the source is ignored.

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use super::{ServiceActionCatalog, ServiceActionEntry};
use crate::errors::{CompactorError, Result};
use crate::providers::JsonProvider;

const SERVICE_MAP_KEY: &str = "serviceMap";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceMapEntry {
    actions: Vec<String>,
    string_prefix: String,
}

/// Build a catalog from catalog JSON text
pub fn load_catalog(json: &str) -> Result<ServiceActionCatalog> {
    let value = JsonProvider::parse_to_value(json)?;
    ServiceActionCatalog::from_json_value(&value)
}

impl ServiceActionCatalog {
    /// Build a catalog from an already-parsed catalog document
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| CompactorError::catalog_format("catalog root is not a JSON object"))?;

        let service_map = root
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(SERVICE_MAP_KEY))
            .map(|(_, value)| value)
            .ok_or_else(|| {
                CompactorError::catalog_format(format!("missing top-level '{}'", SERVICE_MAP_KEY))
            })?
            .as_object()
            .ok_or_else(|| {
                CompactorError::catalog_format(format!("'{}' is not a JSON object", SERVICE_MAP_KEY))
            })?;

        let mut entries = Vec::with_capacity(service_map.len());
        for (service_name, raw) in service_map {
            let parsed = ServiceMapEntry::deserialize(raw).map_err(|e| {
                CompactorError::catalog_format(format!("service '{}': {}", service_name, e))
            })?;
            debug!(
                "Catalog service '{}' -> '{}' ({} actions)",
                service_name,
                parsed.string_prefix,
                parsed.actions.len()
            );
            entries.push(ServiceActionEntry::new(
                service_name.as_str(),
                parsed.string_prefix,
                parsed.actions,
            ));
        }

        let catalog = Self::from_entries(entries);
        info!(
            "Loaded catalog with {} services across {} prefixes",
            catalog.len(),
            catalog.prefix_count()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_catalog_reads_service_map() {
        let catalog = load_catalog(
            r#"{
                "conditionOperators": ["StringEquals"],
                "serviceMap": {
                    "Amazon S3": {
                        "StringPrefix": "s3",
                        "Actions": ["GetObject", "PutObject", "ListBucket"],
                        "ARNFormat": "arn:aws:s3:::<bucket_name>/<key_name>",
                        "HasResource": true
                    },
                    "Amazon EC2": {"StringPrefix": "ec2", "Actions": ["DescribeInstances"]}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let s3 = catalog.lookup_by_wire_prefix("s3");
        assert_eq!(s3[0].actions.len(), 3);
        assert_eq!(
            catalog.lookup_services_by_prefix("ec2")[0].service_display_name,
            "Amazon EC2"
        );
    }

    #[test]
    fn test_service_map_key_is_case_insensitive() {
        let catalog = ServiceActionCatalog::from_json_value(&json!({
            "ServiceMap": {"AWS Lambda": {"StringPrefix": "lambda", "Actions": ["InvokeFunction"]}}
        }))
        .unwrap();

        assert_eq!(catalog.lookup_by_wire_prefix("lambda").len(), 1);
    }

    #[test]
    fn test_missing_service_map_is_catalog_format_error() {
        let error = ServiceActionCatalog::from_json_value(&json!({"services": {}})).unwrap_err();
        assert!(matches!(error, CompactorError::CatalogFormat { .. }));
        assert!(error.to_string().contains("serviceMap"));
    }

    #[test]
    fn test_non_object_root_is_catalog_format_error() {
        let error = ServiceActionCatalog::from_json_value(&json!(["serviceMap"])).unwrap_err();
        assert!(matches!(error, CompactorError::CatalogFormat { .. }));
    }

    #[test]
    fn test_entry_without_prefix_is_catalog_format_error() {
        let error = ServiceActionCatalog::from_json_value(&json!({
            "serviceMap": {"Broken": {"Actions": ["Foo"]}}
        }))
        .unwrap_err();

        assert!(matches!(error, CompactorError::CatalogFormat { .. }));
        assert!(error.to_string().contains("Broken"));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let error = load_catalog(r#"{"serviceMap": "#).unwrap_err();
        assert!(matches!(error, CompactorError::Json { .. }));
    }
}
