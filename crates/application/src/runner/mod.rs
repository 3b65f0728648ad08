//! Collection runner.
//!
//! Executes every request in a collection sequentially against a
//! resolved variable context, isolating per-request failures so the
//! caller always receives a complete picture of partial success.

use std::sync::Arc;

use quiver_domain::{Environment, HistoryEntry, Request, sort_by_order};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::ApplicationError;
use crate::ports::{ExecutionAdapter, ExecutionError, ExecutionResponse, ResolvedCall, RunnerStorage};
use crate::resolver::{VariableContext, resolve, resolve_object};

/// Message returned when a collection has no requests. The run
/// short-circuits before any environment is resolved.
pub const NO_REQUESTS_MESSAGE: &str = "No requests found in collection";

/// Structural errors that abort a whole run or send.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The collection does not exist.
    #[error("Collection not found")]
    CollectionNotFound,

    /// The request does not exist (single send only).
    #[error("Request not found")]
    RequestNotFound,

    /// No environment was supplied and none is marked default.
    #[error("No environment selected")]
    EnvironmentNotSelected,

    /// A single send failed at the request level.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The storage layer failed mid-run.
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

/// Failures scoped to one request inside a run.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The stored verb has no adapter call.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The adapter reported a transport failure.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Enabled query parameters could not be encoded.
    #[error("query encoding failed: {0}")]
    QueryEncoding(String),
}

/// Result of executing one request within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRunResult {
    /// Id of the executed request.
    pub request_id: i64,

    /// Name of the executed request.
    pub request_name: String,

    /// Whether the adapter produced a response (any status code).
    pub success: bool,

    /// Response status, when one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Round-trip time in milliseconds, when a response was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,

    /// Failure description for unsuccessful results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counts over a run. `passed` counts successful results with
/// a status below 400; `failed` counts everything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of executed requests.
    pub total: usize,

    /// Successful results with status < 400.
    pub passed: usize,

    /// Everything else.
    pub failed: usize,
}

/// Outcome of a whole collection run. `success` is true whenever the
/// structural steps (collection + environment resolution) succeeded;
/// individual failures live in `results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    /// Always true for a completed run.
    pub success: bool,

    /// Per-request results in execution order.
    pub results: Vec<RequestRunResult>,

    /// Informational message (set for the empty-collection case).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Aggregate counts.
    pub summary: RunSummary,
}

impl RunOutcome {
    fn empty() -> Self {
        Self {
            success: true,
            results: Vec::new(),
            message: Some(NO_REQUESTS_MESSAGE.to_string()),
            summary: RunSummary::default(),
        }
    }

    fn from_results(results: Vec<RequestRunResult>) -> Self {
        let passed = results
            .iter()
            .filter(|r| r.success && r.status.is_some_and(|s| s < 400))
            .count();
        let summary = RunSummary {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        };
        Self {
            success: true,
            results,
            message: None,
            summary,
        }
    }
}

/// Sequentially executes a collection's requests through the execution
/// adapter, recording history for every attempt that produced a status.
pub struct CollectionRunner<S, A> {
    storage: Arc<S>,
    adapter: Arc<A>,
}

impl<S: RunnerStorage, A: ExecutionAdapter> CollectionRunner<S, A> {
    /// Creates a runner over the given storage and adapter.
    #[must_use]
    pub const fn new(storage: Arc<S>, adapter: Arc<A>) -> Self {
        Self { storage, adapter }
    }

    /// Runs every request in the collection, in (order, id) order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::CollectionNotFound`] for an unknown
    /// collection and [`RunnerError::EnvironmentNotSelected`] when the
    /// collection has requests but no environment can be resolved.
    /// Per-request failures never error; they are absorbed into the
    /// outcome's `results`.
    pub async fn run(
        &self,
        collection_id: i64,
        environment_id: Option<i64>,
    ) -> Result<RunOutcome, RunnerError> {
        let collection = self
            .storage
            .collection(collection_id)
            .await?
            .ok_or(RunnerError::CollectionNotFound)?;

        let mut requests = self.storage.requests_in_collection(collection_id).await?;
        if requests.is_empty() {
            // Designed short-circuit: an empty collection never requires
            // an environment to exist.
            return Ok(RunOutcome::empty());
        }

        let environment = self
            .resolve_environment(environment_id)
            .await?
            .ok_or(RunnerError::EnvironmentNotSelected)?;
        let collection_vars = collection
            .active_environment()
            .map(|e| e.variables.clone())
            .unwrap_or_default();
        let context = VariableContext::from_scopes(environment.variables, collection_vars);

        sort_by_order(&mut requests);
        let timeout_ms = self.storage.request_timeout_ms().await?;

        let mut results = Vec::with_capacity(requests.len());
        for request in &requests {
            results.push(self.execute_one(request, &context, timeout_ms).await?);
        }

        Ok(RunOutcome::from_results(results))
    }

    /// Resolves and executes one request outside of a collection run.
    ///
    /// A missing environment is tolerated here: the request resolves
    /// against the collection scope only (or no variables at all).
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::RequestNotFound`] for an unknown request;
    /// transport failures surface as [`RunnerError::Request`].
    pub async fn send(
        &self,
        request_id: i64,
        environment_id: Option<i64>,
    ) -> Result<ExecutionResponse, RunnerError> {
        let request = self
            .storage
            .request(request_id)
            .await?
            .ok_or(RunnerError::RequestNotFound)?;

        let collection = self.storage.collection(request.collection_id).await?;
        let collection_vars = collection
            .as_ref()
            .and_then(|c| c.active_environment())
            .map(|e| e.variables.clone())
            .unwrap_or_default();
        let global = self
            .resolve_environment(environment_id)
            .await?
            .map(|e| e.variables)
            .unwrap_or_default();
        let context = VariableContext::from_scopes(global, collection_vars);

        let timeout_ms = self.storage.request_timeout_ms().await?;
        let (url, response) = self
            .dispatch(&request, &context, timeout_ms)
            .await
            .map_err(RunnerError::Request)?;

        self.storage
            .record_history(history_entry(&request.method, &url, &response))
            .await?;
        Ok(response)
    }

    async fn resolve_environment(
        &self,
        environment_id: Option<i64>,
    ) -> Result<Option<Environment>, RunnerError> {
        match environment_id {
            Some(id) => Ok(Some(
                self.storage
                    .environment(id)
                    .await?
                    .ok_or(RunnerError::EnvironmentNotSelected)?,
            )),
            None => Ok(self.storage.default_environment().await?),
        }
    }

    async fn execute_one(
        &self,
        request: &Request,
        context: &VariableContext,
        timeout_ms: u64,
    ) -> Result<RequestRunResult, RunnerError> {
        let request_id = request.id.unwrap_or(0);
        debug!(request_id, name = %request.name, method = %request.method, "executing request");

        match self.dispatch(request, context, timeout_ms).await {
            Ok((url, response)) => {
                self.storage
                    .record_history(history_entry(&request.method, &url, &response))
                    .await?;
                Ok(RequestRunResult {
                    request_id,
                    request_name: request.name.clone(),
                    success: true,
                    status: Some(response.status),
                    response_time: Some(response.response_time),
                    error: None,
                })
            }
            Err(error) => Ok(RequestRunResult {
                request_id,
                request_name: request.name.clone(),
                success: false,
                status: None,
                response_time: None,
                error: Some(error.to_string()),
            }),
        }
    }

    /// Resolves one request and dispatches it to the adapter. Returns
    /// the final URL alongside the response so history records what was
    /// actually sent.
    async fn dispatch(
        &self,
        request: &Request,
        context: &VariableContext,
        timeout_ms: u64,
    ) -> Result<(String, ExecutionResponse), RequestError> {
        let url = build_url(request, context)?;
        let call = ResolvedCall {
            url: url.clone(),
            headers: resolve_object(&request.headers, context),
            body: request.body.as_deref().map(|b| resolve(b, context)),
            timeout_ms,
        };

        let response = match request.method.to_ascii_uppercase().as_str() {
            "GET" => self.adapter.get_json(&call).await?,
            "POST" => self.adapter.post_json(&call).await?,
            "PUT" => self.adapter.put_json(&call).await?,
            "PATCH" => self.adapter.patch_json(&call).await?,
            "DELETE" => self.adapter.delete_json(&call).await?,
            "HEAD" => self.adapter.head_json(&call).await?,
            "OPTIONS" => self.adapter.options_json(&call).await?,
            other => return Err(RequestError::UnsupportedMethod(other.to_string())),
        };

        Ok((url, response))
    }
}

/// Resolves the URL and appends enabled query parameters, url-encoded.
fn build_url(request: &Request, context: &VariableContext) -> Result<String, RequestError> {
    let mut url = resolve(&request.url, context);

    let pairs: Vec<(String, String)> = request
        .query_params
        .iter()
        .filter(|p| p.enabled)
        .map(|p| (resolve(&p.key, context), resolve(&p.value, context)))
        .collect();

    if !pairs.is_empty() {
        let encoded = serde_urlencoded::to_string(&pairs)
            .map_err(|e| RequestError::QueryEncoding(e.to_string()))?;
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&encoded);
    }

    Ok(url)
}

fn history_entry(method: &str, url: &str, response: &ExecutionResponse) -> HistoryEntry {
    let mut entry = HistoryEntry::new(method, url, response.status);
    entry.response_time = response.response_time;
    entry.response_body = response.body.clone();
    entry.headers = response.headers.clone();
    entry
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use quiver_domain::{Collection, CollectionEnvironment, QueryParam};

    use super::*;
    use crate::ApplicationResult;

    #[derive(Default)]
    struct FakeStorage {
        collections: Vec<Collection>,
        requests: Vec<Request>,
        environments: Vec<Environment>,
        history: Mutex<Vec<HistoryEntry>>,
    }

    #[async_trait]
    impl RunnerStorage for FakeStorage {
        async fn collection(&self, id: i64) -> ApplicationResult<Option<Collection>> {
            Ok(self.collections.iter().find(|c| c.id == Some(id)).cloned())
        }

        async fn request(&self, id: i64) -> ApplicationResult<Option<Request>> {
            Ok(self.requests.iter().find(|r| r.id == Some(id)).cloned())
        }

        async fn requests_in_collection(
            &self,
            collection_id: i64,
        ) -> ApplicationResult<Vec<Request>> {
            Ok(self
                .requests
                .iter()
                .filter(|r| r.collection_id == collection_id)
                .cloned()
                .collect())
        }

        async fn environment(&self, id: i64) -> ApplicationResult<Option<Environment>> {
            Ok(self.environments.iter().find(|e| e.id == Some(id)).cloned())
        }

        async fn default_environment(&self) -> ApplicationResult<Option<Environment>> {
            Ok(self.environments.iter().find(|e| e.is_default).cloned())
        }

        async fn request_timeout_ms(&self) -> ApplicationResult<u64> {
            Ok(30_000)
        }

        async fn record_history(&self, entry: HistoryEntry) -> ApplicationResult<i64> {
            let mut history = self
                .history
                .lock()
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;
            history.push(entry);
            Ok(history.len() as i64)
        }
    }

    /// Adapter that records the URLs it was called with and fails any
    /// call whose URL contains `unreachable`.
    #[derive(Default)]
    struct FakeAdapter {
        calls: Mutex<Vec<String>>,
    }

    impl FakeAdapter {
        fn respond(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
            self.calls
                .lock()
                .map_err(|e| ExecutionError::Network(e.to_string()))?
                .push(call.url.clone());
            if call.url.contains("unreachable") {
                return Err(ExecutionError::Network("connection refused".to_string()));
            }
            let status = if call.url.contains("broken") { 500 } else { 200 };
            Ok(ExecutionResponse {
                status,
                status_text: String::new(),
                headers: BTreeMap::new(),
                body: "{}".to_string(),
                response_time: 5,
            })
        }
    }

    #[async_trait]
    impl ExecutionAdapter for FakeAdapter {
        async fn get_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
            self.respond(call)
        }
        async fn post_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
            self.respond(call)
        }
        async fn put_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
            self.respond(call)
        }
        async fn patch_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
            self.respond(call)
        }
        async fn delete_json(
            &self,
            call: &ResolvedCall,
        ) -> Result<ExecutionResponse, ExecutionError> {
            self.respond(call)
        }
        async fn head_json(&self, call: &ResolvedCall) -> Result<ExecutionResponse, ExecutionError> {
            self.respond(call)
        }
        async fn options_json(
            &self,
            call: &ResolvedCall,
        ) -> Result<ExecutionResponse, ExecutionError> {
            self.respond(call)
        }
    }

    fn saved_collection(id: i64) -> Collection {
        let mut collection = Collection::new("Test API");
        collection.id = Some(id);
        collection
    }

    fn default_env() -> Environment {
        let mut env = Environment::new("dev").with_variable("base", "https://api.test");
        env.id = Some(50);
        env.is_default = true;
        env
    }

    fn saved_request(id: i64, name: &str, url: &str, order: f64) -> Request {
        let mut request = Request::new(name, "GET", url, 1).with_order(order);
        request.id = Some(id);
        request
    }

    fn runner(storage: FakeStorage) -> (CollectionRunner<FakeStorage, FakeAdapter>, Arc<FakeAdapter>) {
        let adapter = Arc::new(FakeAdapter::default());
        (
            CollectionRunner::new(Arc::new(storage), Arc::clone(&adapter)),
            adapter,
        )
    }

    #[tokio::test]
    async fn unknown_collection_aborts() {
        let (runner, _) = runner(FakeStorage::default());
        let result = runner.run(99, None).await;
        assert!(matches!(result, Err(RunnerError::CollectionNotFound)));
    }

    #[tokio::test]
    async fn empty_collection_short_circuits_without_environment() {
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            ..FakeStorage::default()
        };
        let (runner, _) = runner(storage);

        let outcome = runner.run(1, None).await.expect("run");
        assert!(outcome.success);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.message.as_deref(), Some(NO_REQUESTS_MESSAGE));
    }

    #[tokio::test]
    async fn missing_environment_aborts_non_empty_run() {
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![saved_request(2, "ping", "{{base}}/ping", 1000.0)],
            ..FakeStorage::default()
        };
        let (runner, _) = runner(storage);

        let result = runner.run(1, None).await;
        assert!(matches!(result, Err(RunnerError::EnvironmentNotSelected)));
    }

    #[tokio::test]
    async fn executes_in_order_and_resolves_variables() {
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![
                saved_request(3, "second", "{{base}}/b", 2000.0),
                saved_request(2, "first", "{{base}}/a", 1000.0),
            ],
            environments: vec![default_env()],
            ..FakeStorage::default()
        };
        let (runner, adapter) = runner(storage);

        let outcome = runner.run(1, None).await.expect("run");
        assert_eq!(outcome.summary, RunSummary { total: 2, passed: 2, failed: 0 });

        let calls = adapter.calls.lock().expect("calls").clone();
        assert_eq!(calls, vec!["https://api.test/a", "https://api.test/b"]);
    }

    #[tokio::test]
    async fn collection_scope_overrides_global() {
        let mut collection = saved_collection(1);
        let mut variables = BTreeMap::new();
        variables.insert("base".to_string(), "https://sandbox.test".to_string());
        collection.environments.push(CollectionEnvironment {
            id: 60,
            name: "sandbox".to_string(),
            variables,
        });
        collection.active_environment_id = Some(60);

        let storage = FakeStorage {
            collections: vec![collection],
            requests: vec![saved_request(2, "ping", "{{base}}/ping", 1000.0)],
            environments: vec![default_env()],
            ..FakeStorage::default()
        };
        let (runner, adapter) = runner(storage);

        runner.run(1, None).await.expect("run");
        let calls = adapter.calls.lock().expect("calls").clone();
        assert_eq!(calls, vec!["https://sandbox.test/ping"]);
    }

    #[tokio::test]
    async fn partial_failure_is_isolated() {
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![
                saved_request(2, "ok", "{{base}}/ok", 1000.0),
                saved_request(3, "down", "https://unreachable.test", 2000.0),
            ],
            environments: vec![default_env()],
            ..FakeStorage::default()
        };
        let (runner, _) = runner(storage);

        let outcome = runner.run(1, None).await.expect("run");
        assert!(outcome.success);
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results[0].success);
        assert!(!outcome.results[1].success);
        assert!(outcome.results[1].error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(outcome.summary.failed >= 1);
    }

    #[tokio::test]
    async fn http_error_status_counts_as_failed_but_successful() {
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![saved_request(2, "broken", "{{base}}/broken", 1000.0)],
            environments: vec![default_env()],
            ..FakeStorage::default()
        };
        let (runner, _) = runner(storage);

        let outcome = runner.run(1, None).await.expect("run");
        assert!(outcome.results[0].success);
        assert_eq!(outcome.results[0].status, Some(500));
        assert_eq!(outcome.summary, RunSummary { total: 1, passed: 0, failed: 1 });
    }

    #[tokio::test]
    async fn unsupported_method_fails_only_that_request() {
        let mut odd = saved_request(3, "odd", "{{base}}/odd", 2000.0);
        odd.method = "BREW".to_string();
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![saved_request(2, "ok", "{{base}}/ok", 1000.0), odd],
            environments: vec![default_env()],
            ..FakeStorage::default()
        };
        let (runner, _) = runner(storage);

        let outcome = runner.run(1, None).await.expect("run");
        assert!(outcome.results[0].success);
        assert!(!outcome.results[1].success);
        assert_eq!(
            outcome.results[1].error.as_deref(),
            Some("unsupported method: BREW")
        );
    }

    #[tokio::test]
    async fn enabled_query_params_are_appended_encoded() {
        let mut request = saved_request(2, "search", "{{base}}/search", 1000.0);
        request.query_params = vec![
            QueryParam::new("q", "a b"),
            QueryParam::disabled("skip", "1"),
            QueryParam::new("env", "{{base}}"),
        ];
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![request],
            environments: vec![default_env()],
            ..FakeStorage::default()
        };
        let (runner, adapter) = runner(storage);

        runner.run(1, None).await.expect("run");
        let calls = adapter.calls.lock().expect("calls").clone();
        assert_eq!(
            calls,
            vec!["https://api.test/search?q=a+b&env=https%3A%2F%2Fapi.test"]
        );
    }

    #[tokio::test]
    async fn successful_attempts_record_history() {
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![
                saved_request(2, "ok", "{{base}}/ok", 1000.0),
                saved_request(3, "down", "https://unreachable.test", 2000.0),
            ],
            environments: vec![default_env()],
            ..FakeStorage::default()
        };
        let adapter = Arc::new(FakeAdapter::default());
        let storage = Arc::new(storage);
        let runner = CollectionRunner::new(Arc::clone(&storage), adapter);

        runner.run(1, None).await.expect("run");

        // Only the attempt that produced a status is recorded.
        let history = storage.history.lock().expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].url, "https://api.test/ok");
        assert_eq!(history[0].status, 200);
    }

    #[tokio::test]
    async fn send_tolerates_missing_environment() {
        let storage = FakeStorage {
            collections: vec![saved_collection(1)],
            requests: vec![saved_request(2, "ping", "https://api.test/ping", 1000.0)],
            ..FakeStorage::default()
        };
        let (runner, _) = runner(storage);

        let response = runner.send(2, None).await.expect("send");
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn send_unknown_request_errors() {
        let (runner, _) = runner(FakeStorage::default());
        let result = runner.send(99999, None).await;
        assert!(matches!(result, Err(RunnerError::RequestNotFound)));
    }
}
