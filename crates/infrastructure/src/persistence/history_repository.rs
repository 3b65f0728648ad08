//! Request history repository.
//!
//! History is append-only with a retention cap read from settings:
//! appending past the cap drops the oldest entries in the same
//! operation, so the stored list never exceeds `maxHistory`.

use std::sync::Arc;

use quiver_domain::{HistoryEntry, settings};
use tracing::debug;

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

/// Append, list, and prune operations for the execution history.
#[derive(Clone)]
pub struct HistoryRepository {
    store: Arc<DocumentStore>,
}

impl HistoryRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists history entries, newest first.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        let mut entries = self.store.read().await.request_history.clone();
        entries.reverse();
        entries
    }

    /// Appends an entry, enforcing the retention cap, and returns the
    /// assigned id.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn append(&self, mut entry: HistoryEntry) -> Result<i64, StoreError> {
        let id = self.store.next_id();
        entry.id = Some(id);
        self.store
            .mutate(StoreEvent::saved(EntityKind::History), move |doc| {
                doc.request_history.push(entry);
                let cap = settings::max_history(&doc.settings);
                if doc.request_history.len() > cap {
                    let excess = doc.request_history.len() - cap;
                    debug!(excess, cap, "pruning history past retention cap");
                    doc.request_history.drain(..excess);
                }
                Ok(id)
            })
            .await
    }

    /// Deletes one entry by id, or all entries when `id` is `None`.
    /// Unknown ids succeed silently.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn delete(&self, id: Option<i64>) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::deleted(EntityKind::History), |doc| {
                match id {
                    Some(id) => doc.request_history.retain(|h| h.id != Some(id)),
                    None => doc.request_history.clear(),
                }
                Ok(())
            })
            .await
    }
}
