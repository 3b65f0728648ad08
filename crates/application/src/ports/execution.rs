//! HTTP execution adapter port.
//!
//! The runner never talks to the network directly; it hands a fully
//! resolved call to this adapter and gets back a response or an error.
//! Transport details (TLS, redirects, connection pooling) live behind
//! this boundary.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// A fully resolved request ready for transport: every `{{variable}}`
/// has been substituted and enabled query parameters are already
/// appended to the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Final URL including the query string.
    pub url: String,

    /// Resolved headers.
    pub headers: BTreeMap<String, String>,

    /// Resolved body, if any.
    pub body: Option<String>,

    /// Adapter-level timeout in milliseconds. A timeout surfaces as an
    /// error on this one call, never as a runner-level abort.
    pub timeout_ms: u64,
}

impl ResolvedCall {
    /// Creates a call with no headers or body and the given timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms,
        }
    }
}

/// Response returned by the execution adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResponse {
    /// HTTP status code.
    pub status: u16,

    /// Canonical status text, e.g. `"OK"`.
    pub status_text: String,

    /// Response headers.
    pub headers: BTreeMap<String, String>,

    /// Response body as text.
    pub body: String,

    /// Round-trip time in milliseconds.
    pub response_time: u64,
}

/// Errors the adapter can produce. All of them are scoped to a single
/// request inside a run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The URL could not be parsed after resolution.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request timed out.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// The request failed at the network level (DNS, connect, reset).
    #[error("network error: {0}")]
    Network(String),
}

/// Per-verb HTTP execution. One method per supported verb, mirroring
/// the host-facing adapter contract.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Executes a GET request.
    async fn get_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError>;

    /// Executes a POST request.
    async fn post_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError>;

    /// Executes a PUT request.
    async fn put_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError>;

    /// Executes a PATCH request.
    async fn patch_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError>;

    /// Executes a DELETE request.
    async fn delete_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError>;

    /// Executes a HEAD request.
    async fn head_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError>;

    /// Executes an OPTIONS request.
    async fn options_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError>;
}
