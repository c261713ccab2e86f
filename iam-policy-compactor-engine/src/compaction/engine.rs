//! Compaction engine
//!
//! Ties the expander, statement transformer, combiner and read-only filter
//! to one catalog and one accumulator sid.

use crate::catalog::ServiceActionCatalog;
use crate::expansion::ActionExpander;
use crate::policy::{Policy, DEFAULT_ACCUMULATOR_SID};

use super::combine::PolicyCombiner;
use super::read_only::ReadOnlyFilter;
use super::transform::{DetailedPolicy, StatementTransformer};

/// Policy compaction engine over a shared, read-only catalog
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Engine<'a> {
    expander: ActionExpander<'a>,
    transformer: StatementTransformer<'a>,
    combiner: PolicyCombiner<'a>,
    read_only: ReadOnlyFilter,
}

impl<'a> Engine<'a> {
    /// Create an engine using the default accumulator sid
    pub fn new(catalog: &'a ServiceActionCatalog) -> Self {
        Self::with_accumulator_sid(catalog, DEFAULT_ACCUMULATOR_SID)
    }

    /// Create an engine whose output policies open with `accumulator_sid`
    pub fn with_accumulator_sid(catalog: &'a ServiceActionCatalog, accumulator_sid: &str) -> Self {
        let expander = ActionExpander::new(catalog);
        Self {
            expander,
            transformer: StatementTransformer::new(expander, accumulator_sid),
            combiner: PolicyCombiner::new(expander, accumulator_sid),
            read_only: ReadOnlyFilter::new(),
        }
    }

    pub fn expander(&self) -> ActionExpander<'a> {
        self.expander
    }

    /// Fully enumerate a policy's wildcards
    pub fn detail_policy(&self, policy: &Policy, policy_name: &str) -> DetailedPolicy {
        self.transformer.detail_policy(policy, policy_name)
    }

    /// Reduce a policy to its read-only actions, if any remain
    pub fn minimize_policy(&self, policy: &Policy) -> Option<Policy> {
        self.read_only.minimize(policy)
    }

    /// Detail a policy, then minimize it
    pub fn read_only_policy(
        &self,
        policy: &Policy,
        policy_name: &str,
    ) -> (Option<Policy>, DetailedPolicy) {
        let detailed = self.detail_policy(policy, policy_name);
        (self.minimize_policy(&detailed.policy), detailed)
    }

    /// Merge policies into one, re-collapsing the accumulated actions
    pub fn combine_policies<'p>(
        &self,
        policies: impl IntoIterator<Item = &'p Policy>,
        policy_name: &str,
    ) -> Policy {
        self.combiner.combine(policies, policy_name)
    }
}
