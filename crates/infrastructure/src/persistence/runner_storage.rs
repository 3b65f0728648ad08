//! Runner storage backed by the document store.

use std::sync::Arc;

use async_trait::async_trait;
use quiver_application::error::{ApplicationError, ApplicationResult};
use quiver_application::ports::RunnerStorage;
use quiver_domain::settings::keys;
use quiver_domain::{Collection, Environment, HistoryEntry, Request};
use serde_json::Value;

use crate::persistence::HistoryRepository;
use crate::store::DocumentStore;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// [`RunnerStorage`] implementation over the document store. History
/// writes go through [`HistoryRepository`] so the retention cap is
/// enforced on runner-recorded entries too.
#[derive(Clone)]
pub struct StoreRunnerStorage {
    store: Arc<DocumentStore>,
    history: HistoryRepository,
}

impl StoreRunnerStorage {
    /// Creates runner storage over the given store.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        let history = HistoryRepository::new(Arc::clone(&store));
        Self { store, history }
    }
}

#[async_trait]
impl RunnerStorage for StoreRunnerStorage {
    async fn collection(&self, id: i64) -> ApplicationResult<Option<Collection>> {
        Ok(self
            .store
            .read()
            .await
            .collections
            .iter()
            .find(|c| c.id == Some(id))
            .cloned())
    }

    async fn request(&self, id: i64) -> ApplicationResult<Option<Request>> {
        Ok(self
            .store
            .read()
            .await
            .requests
            .iter()
            .find(|r| r.id == Some(id))
            .cloned())
    }

    async fn requests_in_collection(&self, collection_id: i64) -> ApplicationResult<Vec<Request>> {
        Ok(self
            .store
            .read()
            .await
            .requests
            .iter()
            .filter(|r| r.collection_id == collection_id)
            .cloned()
            .collect())
    }

    async fn environment(&self, id: i64) -> ApplicationResult<Option<Environment>> {
        Ok(self
            .store
            .read()
            .await
            .environments
            .iter()
            .find(|e| e.id == Some(id))
            .cloned())
    }

    async fn default_environment(&self) -> ApplicationResult<Option<Environment>> {
        Ok(self
            .store
            .read()
            .await
            .environments
            .iter()
            .find(|e| e.is_default)
            .cloned())
    }

    async fn request_timeout_ms(&self) -> ApplicationResult<u64> {
        Ok(self
            .store
            .read()
            .await
            .settings
            .get(keys::REQUEST_TIMEOUT)
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    async fn record_history(&self, entry: HistoryEntry) -> ApplicationResult<i64> {
        self.history
            .append(entry)
            .await
            .map_err(|e| ApplicationError::Storage(e.to_string()))
    }
}
