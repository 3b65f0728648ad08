//! Quiver Bridge
//!
//! The host-facing operation catalogue. A [`Bridge`] owns the document
//! store, the entity repositories, and the collection runner, and
//! exposes every operation as an async method returning a serializable
//! envelope. Nothing here panics or leaks raw errors across the
//! boundary: failures travel as data inside the envelope.

pub mod response;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use quiver_application::ports::ExecutionAdapter;
use quiver_application::runner::CollectionRunner;
use quiver_domain::settings::SettingsMap;
use quiver_domain::{
    Collection, CollectionEnvironment, Environment, Folder, HistoryEntry, Preset, Request,
    UnsavedRequest,
};
use quiver_infrastructure::{
    CollectionRepository, DocumentStore, EnvironmentRepository, FolderRepository,
    HistoryRepository, PresetRepository, ReqwestExecutionAdapter, RequestFilter,
    RequestRepository, SettingsRepository, StoreError, StoreEvent, StoreRunnerStorage,
    UnsavedRequestRepository,
};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info;

pub use response::{DataResponse, OpResponse, RunResponse};

/// Response payload for a single request send.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendData {
    /// HTTP status code.
    pub status: u16,

    /// Canonical status text.
    pub status_text: String,

    /// Response headers.
    pub headers: BTreeMap<String, String>,

    /// Response body as text.
    pub body: String,

    /// Round-trip time in milliseconds.
    pub response_time: u64,
}

/// Errors surfaced when constructing a bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The document store failed to open.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The HTTP adapter failed to initialize.
    #[error("adapter initialization failed: {0}")]
    Adapter(String),
}

/// The operation catalogue over one document store.
pub struct Bridge<A> {
    store: Arc<DocumentStore>,
    environments: EnvironmentRepository,
    collections: CollectionRepository,
    folders: FolderRepository,
    requests: RequestRepository,
    history: HistoryRepository,
    unsaved: UnsavedRequestRepository,
    presets: PresetRepository,
    settings: SettingsRepository,
    runner: CollectionRunner<StoreRunnerStorage, A>,
}

impl Bridge<ReqwestExecutionAdapter> {
    /// Opens the document at `path` and wires the default HTTP adapter.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] when the store cannot be opened or the
    /// adapter cannot be built.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BridgeError> {
        let store = Arc::new(DocumentStore::open(path).await?);
        let adapter =
            ReqwestExecutionAdapter::new().map_err(|e| BridgeError::Adapter(e.to_string()))?;
        Ok(Self::with_adapter(store, Arc::new(adapter)))
    }
}

impl<A: ExecutionAdapter> Bridge<A> {
    /// Wires a bridge over an already-open store and a custom adapter.
    #[must_use]
    pub fn with_adapter(store: Arc<DocumentStore>, adapter: Arc<A>) -> Self {
        info!("wiring bridge over document store");
        let storage = Arc::new(StoreRunnerStorage::new(Arc::clone(&store)));
        Self {
            environments: EnvironmentRepository::new(Arc::clone(&store)),
            collections: CollectionRepository::new(Arc::clone(&store)),
            folders: FolderRepository::new(Arc::clone(&store)),
            requests: RequestRepository::new(Arc::clone(&store)),
            history: HistoryRepository::new(Arc::clone(&store)),
            unsaved: UnsavedRequestRepository::new(Arc::clone(&store)),
            presets: PresetRepository::new(Arc::clone(&store)),
            settings: SettingsRepository::new(Arc::clone(&store)),
            runner: CollectionRunner::new(storage, adapter),
            store,
        }
    }

    /// Subscribes to store change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    // --- Environments ---

    /// Lists all global environments.
    pub async fn env_list(&self) -> DataResponse<Vec<Environment>> {
        DataResponse::ok(self.environments.list().await)
    }

    /// Creates or updates a global environment.
    pub async fn env_save(&self, environment: Environment) -> OpResponse {
        OpResponse::from_id_result(self.environments.save(environment).await)
    }

    /// Deletes a global environment.
    pub async fn env_delete(&self, id: i64) -> OpResponse {
        OpResponse::from_result(self.environments.delete(id).await)
    }

    /// Returns the current default environment, if any.
    pub async fn env_get_current(&self) -> DataResponse<Option<Environment>> {
        DataResponse::ok(self.environments.get_current().await)
    }

    /// Makes an environment the default.
    pub async fn env_set_current(&self, id: i64) -> OpResponse {
        OpResponse::from_result(self.environments.set_current(id).await)
    }

    // --- Collections ---

    /// Lists all collections.
    pub async fn collection_list(&self) -> DataResponse<Vec<Collection>> {
        DataResponse::ok(self.collections.list().await)
    }

    /// Creates or updates a collection.
    pub async fn collection_save(&self, collection: Collection) -> OpResponse {
        OpResponse::from_id_result(self.collections.save(collection).await)
    }

    /// Deletes a collection and everything it owns.
    pub async fn collection_delete(&self, id: i64) -> OpResponse {
        OpResponse::from_result(self.collections.delete(id).await)
    }

    /// Flips the favorite flag; the envelope's `data` is the new value.
    pub async fn collection_toggle_favorite(&self, id: i64) -> DataResponse<bool> {
        DataResponse::from_result(self.collections.toggle_favorite(id).await)
    }

    /// Selects (or clears) a collection's active environment.
    pub async fn collection_set_active_environment(
        &self,
        collection_id: i64,
        environment_id: Option<i64>,
    ) -> OpResponse {
        OpResponse::from_result(
            self.collections
                .set_active_environment(collection_id, environment_id)
                .await,
        )
    }

    /// Adds an embedded environment to a collection.
    pub async fn collection_add_environment(
        &self,
        collection_id: i64,
        name: String,
        variables: BTreeMap<String, String>,
    ) -> OpResponse {
        OpResponse::from_id_result(
            self.collections
                .add_environment(collection_id, name, variables)
                .await,
        )
    }

    /// Replaces an embedded environment.
    pub async fn collection_update_environment(
        &self,
        collection_id: i64,
        environment: CollectionEnvironment,
    ) -> OpResponse {
        OpResponse::from_result(
            self.collections
                .update_environment(collection_id, environment)
                .await,
        )
    }

    /// Removes an embedded environment, falling back to the first
    /// remaining one when the active entry is removed.
    pub async fn collection_delete_environment(
        &self,
        collection_id: i64,
        environment_id: i64,
    ) -> OpResponse {
        OpResponse::from_result(
            self.collections
                .delete_environment(collection_id, environment_id)
                .await,
        )
    }

    /// Runs every request in a collection sequentially.
    pub async fn collection_run(
        &self,
        collection_id: i64,
        environment_id: Option<i64>,
    ) -> RunResponse {
        RunResponse::from(self.runner.run(collection_id, environment_id).await)
    }

    // --- Requests ---

    /// Lists requests, optionally scoped to a collection or folder,
    /// sorted by (order, id).
    pub async fn request_list(&self, filter: RequestFilter) -> DataResponse<Vec<Request>> {
        DataResponse::ok(self.requests.list(filter).await)
    }

    /// Creates or updates a request.
    pub async fn request_save(&self, request: Request) -> OpResponse {
        OpResponse::from_id_result(self.requests.save(request).await)
    }

    /// Saves a request positioned directly after another one.
    pub async fn request_save_after(&self, request: Request, after_id: i64) -> OpResponse {
        OpResponse::from_id_result(self.requests.save_after(request, after_id).await)
    }

    /// Deletes a request and its presets.
    pub async fn request_delete(&self, id: i64) -> OpResponse {
        OpResponse::from_result(self.requests.delete(id).await)
    }

    /// Resolves and executes one request, recording history.
    pub async fn request_send(
        &self,
        request_id: i64,
        environment_id: Option<i64>,
    ) -> DataResponse<SendData> {
        DataResponse::from_result(
            self.runner
                .send(request_id, environment_id)
                .await
                .map(|r| SendData {
                    status: r.status,
                    status_text: r.status_text,
                    headers: r.headers,
                    body: r.body,
                    response_time: r.response_time,
                }),
        )
    }

    /// Lists history entries, newest first.
    pub async fn request_history(&self) -> DataResponse<Vec<HistoryEntry>> {
        DataResponse::ok(self.history.list().await)
    }

    /// Deletes one history entry, or all of them when `id` is `None`.
    pub async fn request_delete_history(&self, id: Option<i64>) -> OpResponse {
        OpResponse::from_result(self.history.delete(id).await)
    }

    // --- Folders ---

    /// Lists folders, optionally scoped to a collection.
    pub async fn folder_list(&self, collection_id: Option<i64>) -> DataResponse<Vec<Folder>> {
        DataResponse::ok(self.folders.list(collection_id).await)
    }

    /// Creates or updates a folder.
    pub async fn folder_save(&self, folder: Folder) -> OpResponse {
        OpResponse::from_id_result(self.folders.save(folder).await)
    }

    /// Deletes a folder and the requests placed in it.
    pub async fn folder_delete(&self, id: i64) -> OpResponse {
        OpResponse::from_result(self.folders.delete(id).await)
    }

    // --- Settings ---

    /// Reads one setting, with defaults applied.
    pub async fn settings_get(&self, key: &str) -> DataResponse<Option<Value>> {
        DataResponse::ok(self.settings.get(key).await)
    }

    /// Stores one setting.
    pub async fn settings_set(&self, key: &str, value: Value) -> OpResponse {
        OpResponse::from_result(self.settings.set(key, value).await)
    }

    /// Returns the full settings map, defaults included.
    pub async fn settings_get_all(&self) -> DataResponse<SettingsMap> {
        DataResponse::ok(self.settings.get_all().await)
    }

    /// Restores all settings to their defaults.
    pub async fn settings_reset(&self) -> OpResponse {
        OpResponse::from_result(self.settings.reset().await)
    }

    // --- Drafts ---

    /// Creates or updates a draft request.
    pub async fn unsaved_save(&self, draft: UnsavedRequest) -> OpResponse {
        OpResponse::from_id_result(self.unsaved.save(draft).await)
    }

    /// Lists all drafts.
    pub async fn unsaved_get_all(&self) -> DataResponse<Vec<UnsavedRequest>> {
        DataResponse::ok(self.unsaved.list().await)
    }

    /// Deletes a draft.
    pub async fn unsaved_delete(&self, id: i64) -> OpResponse {
        OpResponse::from_result(self.unsaved.delete(id).await)
    }

    /// Deletes all drafts.
    pub async fn unsaved_clear(&self) -> OpResponse {
        OpResponse::from_result(self.unsaved.clear().await)
    }

    /// Promotes a draft into a saved request; the envelope's id is the
    /// new request id.
    pub async fn unsaved_promote(
        &self,
        id: i64,
        collection_id: i64,
        folder_id: Option<i64>,
    ) -> OpResponse {
        OpResponse::from_id_result(self.unsaved.promote(id, collection_id, folder_id).await)
    }

    // --- Presets ---

    /// Lists presets, optionally scoped to a request.
    pub async fn preset_list(&self, request_id: Option<i64>) -> DataResponse<Vec<Preset>> {
        DataResponse::ok(self.presets.list(request_id).await)
    }

    /// Creates or updates a preset.
    pub async fn preset_save(&self, preset: Preset) -> OpResponse {
        OpResponse::from_id_result(self.presets.save(preset).await)
    }

    /// Deletes a preset.
    pub async fn preset_delete(&self, id: i64) -> OpResponse {
        OpResponse::from_result(self.presets.delete(id).await)
    }
}
