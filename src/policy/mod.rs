pub mod hot_reload;
pub mod loader;

pub use hot_reload::PolicyWatcher;
pub use loader::{load_policy_file, load_policy_files, LoadError, PolicyLoader};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::Policy;

/// Errors raised while building a policy store.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// A policy record failed structural validation. Fatal to the whole
    /// load; a store is never left partially populated.
    #[error("malformed policy entry {index}: {reason}")]
    Malformed { index: usize, reason: String },

    /// A merge failed because one of its sources was malformed.
    #[error("policy merge failed: {0}")]
    Merge(#[source] Box<PolicyError>),
}

/// An ordered, immutable collection of policies.
///
/// Order is semantically significant: evaluation scans the store front to
/// back and stops at the first structural match. Construction happens once
/// per configuration load; evaluation reads the store without locking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyStore {
    policies: Vec<Policy>,
}

impl PolicyStore {
    /// Build a store from already-validated policies, order preserved.
    pub fn new(policies: Vec<Policy>) -> Self {
        PolicyStore { policies }
    }

    /// Build a store from an already-deserialized sequence of policy
    /// records (the output of a YAML or JSON parser).
    ///
    /// All-or-nothing: the first malformed entry fails the whole load.
    pub fn load(source: &Value) -> Result<Self, PolicyError> {
        let entries = source.as_array().ok_or_else(|| PolicyError::Malformed {
            index: 0,
            reason: "policy source must be a sequence of records".to_string(),
        })?;

        let mut policies = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let policy: Policy =
                serde_json::from_value(entry.clone()).map_err(|e| PolicyError::Malformed {
                    index,
                    reason: e.to_string(),
                })?;
            policies.push(policy);
        }

        Ok(PolicyStore { policies })
    }

    /// Concatenate stores into one, source order preserved, no
    /// deduplication. The result's policy count is the sum of the inputs'.
    pub fn merge<I: IntoIterator<Item = PolicyStore>>(stores: I) -> Self {
        let policies = stores
            .into_iter()
            .flat_map(|store| store.policies)
            .collect();
        PolicyStore { policies }
    }

    /// Load and merge several raw sources. All-or-nothing: any malformed
    /// source fails the merge, wrapped in [`PolicyError::Merge`].
    pub fn merge_sources(sources: &[Value]) -> Result<Self, PolicyError> {
        let stores = sources
            .iter()
            .map(PolicyStore::load)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PolicyError::Merge(Box::new(e)))?;
        Ok(PolicyStore::merge(stores))
    }

    /// The first policy whose (role, intent, conditions) triple matches.
    ///
    /// Later policies are never consulted once one matches, even if they
    /// would also match.
    pub fn first_match(
        &self,
        role: &str,
        intent: &str,
        attributes: &Map<String, Value>,
    ) -> Option<&Policy> {
        self.policies
            .iter()
            .find(|policy| policy.matches(role, intent, attributes))
    }

    /// Policies in precedence order.
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
