use reqwest::{StatusCode, Url};
use std::time::Duration;
use thiserror::Error;

use crate::audit::AuditRecord;
use crate::domain::{AccessRequest, DecisionResult};

/// Errors on the remote evaluation path. All of these are recoverable by
/// local fallback when a local store is configured.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("invalid remote endpoint: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decision service returned {0}")]
    Status(StatusCode),

    #[error("malformed decision service response: {0}")]
    Body(#[source] reqwest::Error),
}

/// Handle to a remote decision service.
///
/// The endpoint URL is parsed and the HTTP client (with its request
/// timeout) is built at construction time, so a misconfigured remote
/// fails fast instead of on first use. An unbounded wait is not possible:
/// the timeout applies to every request.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RemoteEndpoint {
    /// Build a handle for the decision service at `base_url`, with a
    /// bounded per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base_url =
            Url::parse(base_url).map_err(|e| RemoteError::Config(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(RemoteEndpoint {
            http,
            base_url,
            api_key: None,
        })
    }

    /// Attach a bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn route(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::Config(format!("{path}: {e}")))
    }

    /// Send one evaluation request. The successful response body is the
    /// Decision Result verbatim; it is not re-validated or re-shaped.
    pub async fn evaluate(&self, request: &AccessRequest) -> Result<DecisionResult, RemoteError> {
        let mut req = self.http.post(self.route("v1/decision/evaluate")?).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }

        response.json::<DecisionResult>().await.map_err(RemoteError::Body)
    }

    /// Post one audit record. Callers treat any failure as best-effort.
    pub async fn submit_audit(&self, record: &AuditRecord) -> Result<(), RemoteError> {
        let mut req = self.http.post(self.route("v1/audit")?).json(record);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }

        Ok(())
    }

    /// The configured service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}
