//! Quiver Infrastructure
//!
//! Concrete adapters behind the application-layer ports: the file-backed
//! document store, the typed entity repositories over it, and the
//! reqwest-based HTTP execution adapter.

pub mod adapters;
pub mod error;
pub mod persistence;
pub mod serialization;
pub mod store;

pub use adapters::ReqwestExecutionAdapter;
pub use error::StoreError;
pub use persistence::{
    CollectionRepository, EnvironmentRepository, FolderRepository, HistoryRepository,
    PresetRepository, RequestFilter, RequestRepository, SettingsRepository, StoreRunnerStorage,
    UnsavedRequestRepository,
};
pub use store::{ChangeKind, DocumentStore, EntityKind, StoreEvent};
