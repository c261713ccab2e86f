//! Merging many policies into one
//!
//! Allow-all statements from every input are merged into a single accumulator
//! statement whose action set is then re-collapsed into the smallest
//! equivalent wildcard form. All other statements are carried over unchanged.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::expansion::ActionExpander;
use crate::policy::{ActionIdentifier, Policy};

#[derive(Debug, Clone)]
pub struct PolicyCombiner<'a> {
    expander: ActionExpander<'a>,
    accumulator_sid: String,
}

impl<'a> PolicyCombiner<'a> {
    pub fn new(expander: ActionExpander<'a>, accumulator_sid: impl Into<String>) -> Self {
        Self {
            expander,
            accumulator_sid: accumulator_sid.into(),
        }
    }

    /// Combine policies into one named policy
    ///
    /// Surviving statements keep input policy order, then statement order.
    pub fn combine<'p>(
        &self,
        policies: impl IntoIterator<Item = &'p Policy>,
        policy_name: &str,
    ) -> Policy {
        let mut combined = Policy::base(policy_name, &self.accumulator_sid);
        let mut giant_action_list = BTreeSet::new();

        for policy in policies {
            for statement in &policy.statements {
                if statement.is_unconditional_allow_all() {
                    giant_action_list.extend(statement.actions.iter().cloned());
                } else {
                    combined.statements.push(statement.clone());
                }
            }
        }

        debug!(
            "{}: {} accumulated actions, {} standalone statements",
            policy_name,
            giant_action_list.len(),
            combined.statements.len() - 1
        );

        combined.statements[0].actions = self.recollapse(&giant_action_list);
        combined
    }

    /// Reduce an action set to its smallest equivalent wildcard form
    ///
    /// Wildcards made redundant by a broader wildcard of the same prefix or
    /// stem are removed, and so is every concrete action a surviving wildcard
    /// already implies. Wildcards the catalog cannot resolve imply nothing.
    ///
    /// Grouping compares prefixes by exact string, so `S3:*` does not absorb
    /// `s3:Get*`. Concrete actions are still removed case-insensitively,
    /// through expansion.
    pub fn recollapse(&self, actions: &BTreeSet<ActionIdentifier>) -> BTreeSet<ActionIdentifier> {
        let wildcards: BTreeSet<ActionIdentifier> =
            actions.iter().filter(|a| a.is_wildcard()).cloned().collect();
        let survivors = surviving_wildcards(&wildcards);
        let redundant: BTreeSet<ActionIdentifier> =
            wildcards.difference(&survivors).cloned().collect();

        let implied: BTreeSet<ActionIdentifier> = survivors
            .iter()
            .filter_map(|wildcard| match self.expander.expand(wildcard) {
                Ok(expanded) => Some(expanded),
                Err(error) => {
                    debug!("Re-collapse keeps {} without implied actions: {}", wildcard, error);
                    None
                }
            })
            .flatten()
            .collect();

        let collapsed: BTreeSet<ActionIdentifier> = actions
            .difference(&redundant)
            .filter(|action| !implied.contains(*action))
            .cloned()
            .collect();

        debug!(
            "Re-collapsed {} actions to {} ({} redundant wildcards)",
            actions.len(),
            collapsed.len(),
            redundant.len()
        );
        collapsed
    }
}

/// Pick the wildcards that stand for their prefix or stem group
///
/// `prefix:*` wins over everything else sharing its prefix. Otherwise
/// `prefix:Stem*` wins over the other wildcards whose text up to the first `*`
/// is the same stem. Groups without such a representative keep every member.
fn surviving_wildcards(wildcards: &BTreeSet<ActionIdentifier>) -> BTreeSet<ActionIdentifier> {
    let mut by_prefix: BTreeMap<Option<&str>, Vec<&ActionIdentifier>> = BTreeMap::new();
    for wildcard in wildcards {
        by_prefix
            .entry(wildcard.service_prefix())
            .or_default()
            .push(wildcard);
    }

    let mut survivors = BTreeSet::new();
    for (prefix, group) in by_prefix {
        let Some(prefix) = prefix else {
            survivors.extend(group.into_iter().cloned());
            continue;
        };

        let full_service = ActionIdentifier::qualified(prefix, "*");
        if wildcards.contains(&full_service) {
            survivors.insert(full_service);
            continue;
        }

        let mut by_stem: BTreeMap<&str, Vec<&ActionIdentifier>> = BTreeMap::new();
        for wildcard in group {
            by_stem
                .entry(wildcard.collapse_stem().unwrap_or_default())
                .or_default()
                .push(wildcard);
        }
        for (stem, members) in by_stem {
            let representative = ActionIdentifier::qualified(prefix, &format!("{}*", stem));
            if wildcards.contains(&representative) {
                survivors.insert(representative);
            } else {
                survivors.extend(members.into_iter().cloned());
            }
        }
    }
    survivors
}
