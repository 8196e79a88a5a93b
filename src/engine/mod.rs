//! The policy decision point: a pure, side-effect-free mapping from
//! (policy store, request) to a filtered view of the resource.
//!
//! Evaluation never mutates the input resource and allocates only the
//! result, so any number of callers may evaluate against the same store
//! concurrently without coordination.

use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{AccessRequest, DecisionMeta, DecisionResult, Resource, MASKED};
use crate::policy::PolicyStore;

/// Errors raised by evaluation.
///
/// Ordinary non-matches (unknown role or intent, failed conditions,
/// unmentioned fields) are deny/omit outcomes, never errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvalError {
    /// Evaluation was attempted against an empty store. A caller-usage
    /// error, distinct from the empty-result deny-all outcome.
    #[error("no policies loaded")]
    NoPolicyLoaded,
}

/// Evaluate a single request against a policy store.
///
/// The first policy whose (role, intent, conditions) triple matches decides
/// the whole request. Each resource field is then processed independently:
/// denied fields are omitted, masked fields are replaced by [`MASKED`],
/// allowed fields pass through unchanged, and anything unmentioned is
/// withheld. If the caller supplied a non-empty `justification` attribute
/// and the matched policy defines `justification_ttl`, the result carries
/// `_meta.expires_at` that many minutes in the future.
pub fn evaluate(store: &PolicyStore, request: &AccessRequest) -> Result<DecisionResult, EvalError> {
    if store.is_empty() {
        return Err(EvalError::NoPolicyLoaded);
    }

    let Some(policy) = store.first_match(&request.role, &request.intent, &request.attributes)
    else {
        // Implicit deny-all
        return Ok(DecisionResult::empty());
    };

    let mut fields = Map::with_capacity(request.resource.len());
    for (name, value) in &request.resource {
        if policy.deny.contains(name) {
            continue;
        }
        if policy.mask.contains(name) {
            fields.insert(name.clone(), Value::String(MASKED.to_string()));
            continue;
        }
        if policy.allow.permits(name) {
            fields.insert(name.clone(), value.clone());
        }
    }

    let meta = match (request.justification(), policy.justification_ttl) {
        (Some(_), Some(ttl_minutes)) => Some(DecisionMeta {
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        }),
        _ => None,
    };

    Ok(DecisionResult { fields, meta })
}

/// Evaluate the same (role, intent, attributes) triple against each
/// resource in turn, preserving input order.
///
/// Each resource is evaluated independently; there is no cross-resource
/// state. The only possible failure is [`EvalError::NoPolicyLoaded`],
/// which aborts the whole batch rather than producing a partial list.
pub fn evaluate_many(
    store: &PolicyStore,
    role: &str,
    intent: &str,
    attributes: &Map<String, Value>,
    resources: &[Resource],
) -> Result<Vec<DecisionResult>, EvalError> {
    resources
        .iter()
        .map(|resource| {
            let request = AccessRequest::new(role, intent, attributes.clone(), resource.clone());
            evaluate(store, &request)
        })
        .collect()
}
