//! Wildcard action expansion
//!
//! Maps one action expression to the concrete `prefix:Action` identifiers it
//! denotes according to the [`ServiceActionCatalog`]:
//!
//! - `prefix:*` expands to every action of every service using `prefix`
//! - `prefix:Stem*` expands to the actions whose name starts with `Stem`
//! - anything without a trailing `*` stands for itself
//!
//! Prefix and stem matching ignore ASCII case. Emitted identifiers use the
//! prefix and action spelling found in the catalog.

use std::collections::BTreeSet;

use log::debug;
use thiserror::Error;

use crate::catalog::{ServiceActionCatalog, ServiceActionEntry};
use crate::policy::{ActionIdentifier, ActionPattern};

/// Why a wildcard contributed nothing
///
/// Never fatal: the wildcard is dropped and processing continues. These are
/// expected whenever the catalog lags behind the services in use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    /// No catalog service uses the wildcard's prefix
    #[error("{action}: no catalog service uses prefix '{prefix}'")]
    UnresolvedWildcard {
        action: ActionIdentifier,
        prefix: String,
    },

    /// The prefix is known but no action matches
    #[error("{action}: prefix '{prefix}' has no matching actions")]
    EmptyExpansion {
        action: ActionIdentifier,
        prefix: String,
    },
}

impl ExpansionError {
    pub fn action(&self) -> &ActionIdentifier {
        match self {
            Self::UnresolvedWildcard { action, .. } | Self::EmptyExpansion { action, .. } => action,
        }
    }
}

/// Expands action expressions against a shared catalog
#[derive(Debug, Clone, Copy)]
pub struct ActionExpander<'a> {
    catalog: &'a ServiceActionCatalog,
}

impl<'a> ActionExpander<'a> {
    pub fn new(catalog: &'a ServiceActionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a ServiceActionCatalog {
        self.catalog
    }

    /// Expand one action expression
    ///
    /// Concrete actions come back as a singleton set. A wildcard that
    /// resolves to nothing yields an [`ExpansionError`] instead of an empty set.
    pub fn expand(
        &self,
        action: &ActionIdentifier,
    ) -> Result<BTreeSet<ActionIdentifier>, ExpansionError> {
        match action.pattern() {
            ActionPattern::Concrete => Ok(BTreeSet::from([action.clone()])),
            ActionPattern::FullService { prefix } => {
                self.expand_matching(action, prefix, |_| true)
            }
            ActionPattern::Descriptor { prefix, stem } => {
                self.expand_matching(action, prefix, |name| starts_with_ignore_case(name, stem))
            }
            ActionPattern::Unqualified => Err(ExpansionError::UnresolvedWildcard {
                action: action.clone(),
                prefix: String::new(),
            }),
        }
    }

    fn expand_matching(
        &self,
        action: &ActionIdentifier,
        prefix: &str,
        keep: impl Fn(&str) -> bool,
    ) -> Result<BTreeSet<ActionIdentifier>, ExpansionError> {
        let entries = self.catalog.lookup_by_wire_prefix(prefix);
        if entries.is_empty() {
            return Err(ExpansionError::UnresolvedWildcard {
                action: action.clone(),
                prefix: prefix.to_string(),
            });
        }
        self.log_services(action, &entries);

        let keep = &keep;
        let expanded: BTreeSet<ActionIdentifier> = entries
            .iter()
            .flat_map(|entry| {
                entry
                    .actions
                    .iter()
                    .filter(move |name| keep(name.as_str()))
                    .map(move |name| ActionIdentifier::qualified(&entry.wire_prefix, name))
            })
            .collect();

        if expanded.is_empty() {
            return Err(ExpansionError::EmptyExpansion {
                action: action.clone(),
                prefix: prefix.to_string(),
            });
        }

        debug!("{} expanded to {} actions", action, expanded.len());
        Ok(expanded)
    }

    fn log_services(&self, action: &ActionIdentifier, entries: &[&ServiceActionEntry]) {
        for entry in entries {
            let aliases = self.catalog.lookup_services_by_prefix(&entry.wire_prefix);
            if aliases.len() > 1 {
                debug!(
                    "{} resolves through '{}' ({} aliases share '{}')",
                    action,
                    entry.service_name,
                    aliases.len(),
                    entry.wire_prefix
                );
            } else {
                debug!("{} resolves through '{}'", action, entry.service_name);
            }
        }
    }
}

fn starts_with_ignore_case(name: &str, stem: &str) -> bool {
    name.get(..stem.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::sample_catalog;

    fn names(set: &BTreeSet<ActionIdentifier>) -> Vec<&str> {
        set.iter().map(ActionIdentifier::as_str).collect()
    }

    #[test]
    fn test_full_service_wildcard_expands_all_actions() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let expanded = expander.expand(&"s3:*".into()).unwrap();
        assert_eq!(
            names(&expanded),
            vec!["s3:GetObject", "s3:ListBucket", "s3:PutObject"]
        );
    }

    #[test]
    fn test_descriptor_wildcard_filters_by_stem() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let expanded = expander.expand(&"s3:Get*".into()).unwrap();
        assert_eq!(names(&expanded), vec!["s3:GetObject"]);

        let expanded = expander.expand(&"ec2:describe*".into()).unwrap();
        assert_eq!(
            names(&expanded),
            vec!["ec2:DescribeInstances", "ec2:DescribeTags"]
        );
    }

    #[test]
    fn test_prefix_lookup_ignores_case_and_uses_catalog_spelling() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let expanded = expander.expand(&"S3:List*".into()).unwrap();
        assert_eq!(names(&expanded), vec!["s3:ListBucket"]);
    }

    #[test]
    fn test_aliases_are_deduplicated() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let expanded = expander.expand(&"iam:*".into()).unwrap();
        assert_eq!(
            names(&expanded),
            vec!["iam:CreateRole", "iam:GetRole", "iam:ListRoles", "iam:PassRole"]
        );
    }

    #[test]
    fn test_concrete_action_passes_through() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let expanded = expander.expand(&"zzz:DoThing".into()).unwrap();
        assert_eq!(names(&expanded), vec!["zzz:DoThing"]);
    }

    #[test]
    fn test_unknown_prefix_is_unresolved() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let error = expander.expand(&"zzz:*".into()).unwrap_err();
        assert_eq!(
            error,
            ExpansionError::UnresolvedWildcard {
                action: "zzz:*".into(),
                prefix: "zzz".to_string(),
            }
        );
    }

    #[test]
    fn test_known_prefix_without_matches_is_empty_expansion() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let error = expander.expand(&"s3:Delete*".into()).unwrap_err();
        assert!(matches!(error, ExpansionError::EmptyExpansion { .. }));

        let error = expander.expand(&"empty:*".into()).unwrap_err();
        assert!(matches!(error, ExpansionError::EmptyExpansion { .. }));
        assert_eq!(error.action().as_str(), "empty:*");
    }

    #[test]
    fn test_bare_star_is_unresolved() {
        let catalog = sample_catalog();
        let expander = ActionExpander::new(&catalog);

        let error = expander.expand(&"*".into()).unwrap_err();
        assert!(matches!(error, ExpansionError::UnresolvedWildcard { .. }));
    }

    #[test]
    fn test_stem_longer_than_name_does_not_match() {
        assert!(!starts_with_ignore_case("Get", "GetObjectAcl"));
        assert!(starts_with_ignore_case("GetObjectAcl", "getobject"));
        assert!(starts_with_ignore_case("Anything", ""));
    }
}
