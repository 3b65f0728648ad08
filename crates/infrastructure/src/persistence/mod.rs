//! Typed entity repositories over the document store.
//!
//! Each repository is a thin facade: it owns no state besides a handle
//! to the store, generates ids, enforces cross-entity invariants
//! (default environment, cascade delete, ordering), and keeps every
//! operation atomic with respect to the document.

mod collection_repository;
mod environment_repository;
mod folder_repository;
mod history_repository;
mod preset_repository;
mod request_repository;
mod runner_storage;
mod settings_repository;
mod unsaved_repository;

pub use collection_repository::CollectionRepository;
pub use environment_repository::EnvironmentRepository;
pub use folder_repository::FolderRepository;
pub use history_repository::HistoryRepository;
pub use preset_repository::PresetRepository;
pub use request_repository::{RequestFilter, RequestRepository};
pub use runner_storage::StoreRunnerStorage;
pub use settings_repository::SettingsRepository;
pub use unsaved_repository::UnsavedRequestRepository;

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::store::DocumentStore;

    /// Opens a store in a fresh temp directory. The directory guard
    /// must stay alive for the duration of the test.
    pub async fn open_store() -> (TempDir, Arc<DocumentStore>) {
        let dir = TempDir::new().expect("tempdir");
        let store = DocumentStore::open(dir.path().join("quiver.json"))
            .await
            .expect("open store");
        (dir, Arc::new(store))
    }
}
