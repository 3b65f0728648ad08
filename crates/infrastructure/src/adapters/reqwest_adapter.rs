//! HTTP execution over reqwest.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use quiver_application::ports::{
    ExecutionAdapter, ExecutionError, ExecutionResponse, ResolvedCall,
};
use reqwest::{Client, Method, StatusCode, redirect::Policy};
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("Quiver/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// [`ExecutionAdapter`] backed by a shared [`reqwest::Client`].
///
/// The client is built once and reused across calls so connections are
/// pooled. Per-call timeouts come from the [`ResolvedCall`], not the
/// client.
#[derive(Clone)]
pub struct ReqwestExecutionAdapter {
    client: Client,
}

impl ReqwestExecutionAdapter {
    /// Creates an adapter with redirect following and TLS verification
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Network`] when the TLS backend cannot
    /// be initialized.
    pub fn new() -> Result<Self, ExecutionError> {
        Self::with_options(true, true)
    }

    /// Creates an adapter with explicit redirect and TLS verification
    /// behavior, matching the `followRedirects` and `sslVerification`
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Network`] when the TLS backend cannot
    /// be initialized.
    pub fn with_options(
        follow_redirects: bool,
        ssl_verification: bool,
    ) -> Result<Self, ExecutionError> {
        let redirect = if follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect)
            .danger_accept_invalid_certs(!ssl_verification)
            .build()
            .map_err(|e| ExecutionError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(
        &self,
        method: Method,
        call: &ResolvedCall,
    ) -> Result<ExecutionResponse, ExecutionError> {
        let url = Url::parse(&call.url).map_err(|e| ExecutionError::InvalidUrl(e.to_string()))?;
        debug!(%method, %url, timeout_ms = call.timeout_ms, "executing request");

        let mut builder = self
            .client
            .request(method, url)
            .timeout(Duration::from_millis(call.timeout_ms));
        for (name, value) in &call.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &call.body {
            builder = builder.body(body.clone());
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ExecutionError::Timeout {
                    timeout_ms: call.timeout_ms,
                }
            } else {
                ExecutionError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ExecutionError::Network(e.to_string()))?;

        Ok(ExecutionResponse {
            status: status.as_u16(),
            status_text: status_text(status),
            headers,
            body,
            response_time: started.elapsed().as_millis() as u64,
        })
    }
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("").to_string()
}

#[async_trait]
impl ExecutionAdapter for ReqwestExecutionAdapter {
    async fn get_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
        self.execute(Method::GET, call).await
    }

    async fn post_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
        self.execute(Method::POST, call).await
    }

    async fn put_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
        self.execute(Method::PUT, call).await
    }

    async fn patch_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
        self.execute(Method::PATCH, call).await
    }

    async fn delete_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
        self.execute(Method::DELETE, call).await
    }

    async fn head_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
        self.execute(Method::HEAD, call).await
    }

    async fn options_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
        self.execute(Method::OPTIONS, call).await
    }
}
