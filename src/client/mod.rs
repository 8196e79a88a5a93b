//! Evaluation client: one `evaluate` contract whether the decision is
//! computed locally or by a remote decision service.
//!
//! The client composes an optional local [`PolicyStore`] with an optional
//! [`RemoteEndpoint`] and branches explicitly. When the remote path fails
//! and a local store is configured, the same request is transparently
//! retried locally, exactly once; when no local store exists, the failure
//! surfaces as [`ClientError::RemoteUnavailable`] so an unreachable
//! decision service is never mistaken for a legitimate deny-all.

pub mod remote;

pub use remote::{RemoteEndpoint, RemoteError};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::audit::AuditRecord;
use crate::domain::{AccessRequest, DecisionResult, Resource};
use crate::engine::{self, EvalError};
use crate::policy::PolicyStore;

/// Errors surfaced by the evaluation client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// The remote call failed and no local fallback exists.
    #[error("remote evaluation unavailable: {0}")]
    RemoteUnavailable(String),
}

/// Access-decision client holding an optional local store and an optional
/// remote endpoint.
#[derive(Debug, Clone, Default)]
pub struct EvaluationClient {
    local: Option<PolicyStore>,
    remote: Option<RemoteEndpoint>,
}

impl EvaluationClient {
    /// A client with neither a local store nor a remote endpoint.
    pub fn new() -> Self {
        EvaluationClient::default()
    }

    /// Configure a local policy store for direct evaluation and as the
    /// fallback for remote failures.
    pub fn with_local(mut self, store: PolicyStore) -> Self {
        self.local = Some(store);
        self
    }

    /// Configure a remote decision service.
    pub fn with_remote(mut self, endpoint: RemoteEndpoint) -> Self {
        self.remote = Some(endpoint);
        self
    }

    /// True when a local policy store is configured.
    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// True when a remote endpoint is configured.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Evaluate through whichever path is configured: the remote service
    /// when one exists (with local fallback), the local store otherwise.
    pub async fn evaluate(&self, request: &AccessRequest) -> Result<DecisionResult, ClientError> {
        if self.remote.is_some() {
            self.evaluate_remote(request).await
        } else {
            self.evaluate_local(request)
        }
    }

    /// Evaluate against the local policy store.
    pub fn evaluate_local(&self, request: &AccessRequest) -> Result<DecisionResult, ClientError> {
        let store = self.local.as_ref().ok_or(EvalError::NoPolicyLoaded)?;
        Ok(engine::evaluate(store, request)?)
    }

    /// Evaluate each resource against the local store, preserving input
    /// order.
    pub fn evaluate_many_local(
        &self,
        role: &str,
        intent: &str,
        attributes: &Map<String, Value>,
        resources: &[Resource],
    ) -> Result<Vec<DecisionResult>, ClientError> {
        let store = self.local.as_ref().ok_or(EvalError::NoPolicyLoaded)?;
        Ok(engine::evaluate_many(store, role, intent, attributes, resources)?)
    }

    /// Evaluate via the remote decision service, falling back to the
    /// local store on failure.
    ///
    /// Exactly one remote attempt is made, then exactly one fallback
    /// attempt; there is no retry loop on the remote path itself.
    pub async fn evaluate_remote(
        &self,
        request: &AccessRequest,
    ) -> Result<DecisionResult, ClientError> {
        let Some(endpoint) = &self.remote else {
            if self.local.is_some() {
                warn!("no remote endpoint configured, evaluating locally");
                return self.evaluate_local(request);
            }
            return Err(ClientError::RemoteUnavailable(
                "no remote endpoint configured".to_string(),
            ));
        };

        match endpoint.evaluate(request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(
                    endpoint = %endpoint.base_url(),
                    error = %e,
                    "remote evaluation failed"
                );
                if self.local.is_some() {
                    self.evaluate_local(request)
                } else {
                    Err(ClientError::RemoteUnavailable(e.to_string()))
                }
            }
        }
    }

    /// Post a best-effort audit record to the remote endpoint.
    ///
    /// Failures are logged and swallowed; audit submission must never
    /// interrupt the caller's access flow.
    pub async fn log_access(&self, record: &AuditRecord) {
        let Some(endpoint) = &self.remote else {
            warn!(
                role = %record.role,
                intent = %record.intent,
                "audit record dropped: no remote endpoint configured"
            );
            return;
        };

        if let Err(e) = endpoint.submit_audit(record).await {
            warn!(
                endpoint = %endpoint.base_url(),
                role = %record.role,
                intent = %record.intent,
                error = %e,
                "failed to submit audit record"
            );
        }
    }
}
