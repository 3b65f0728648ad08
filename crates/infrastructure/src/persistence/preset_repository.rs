//! Preset repository.

use std::sync::Arc;

use quiver_domain::{Document, Preset};

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

fn check_request(doc: &Document, request_id: i64) -> Result<(), StoreError> {
    if doc.requests.iter().any(|r| r.id == Some(request_id)) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "request {request_id} does not exist"
        )))
    }
}

/// CRUD operations for request presets.
#[derive(Clone)]
pub struct PresetRepository {
    store: Arc<DocumentStore>,
}

impl PresetRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists presets, optionally filtered by owning request.
    pub async fn list(&self, request_id: Option<i64>) -> Vec<Preset> {
        self.store
            .read()
            .await
            .presets
            .iter()
            .filter(|p| request_id.is_none_or(|id| p.request_id == id))
            .cloned()
            .collect()
    }

    /// Saves a preset. The owning request must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when `requestId` does not
    /// reference an existing request, [`StoreError::NotFound`] for an
    /// unknown preset id, or a persist error.
    pub async fn save(&self, mut preset: Preset) -> Result<i64, StoreError> {
        let event = StoreEvent::saved(EntityKind::Preset);
        match preset.id {
            Some(id) => {
                self.store
                    .mutate(event, |doc| {
                        check_request(doc, preset.request_id)?;
                        let existing = doc
                            .presets
                            .iter_mut()
                            .find(|p| p.id == Some(id))
                            .ok_or_else(|| StoreError::NotFound(format!("preset {id}")))?;
                        *existing = preset;
                        Ok(id)
                    })
                    .await
            }
            None => {
                let id = self.store.next_id();
                preset.id = Some(id);
                self.store
                    .mutate(event, move |doc| {
                        check_request(doc, preset.request_id)?;
                        doc.presets.push(preset);
                        Ok(id)
                    })
                    .await
            }
        }
    }

    /// Deletes a preset. Unknown ids succeed silently.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::deleted(EntityKind::Preset), |doc| {
                doc.presets.retain(|p| p.id != Some(id));
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quiver_domain::{Collection, Request};

    use super::super::test_util::open_store;
    use super::*;
    use crate::persistence::{CollectionRepository, RequestRepository};

    #[tokio::test]
    async fn save_requires_existing_request() {
        let (_dir, store) = open_store().await;
        let repo = PresetRepository::new(store);

        let result = repo.save(Preset::new("auth header", 12345)).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn list_filters_by_request() {
        let (_dir, store) = open_store().await;
        let collections = CollectionRepository::new(Arc::clone(&store));
        let requests = RequestRepository::new(Arc::clone(&store));
        let repo = PresetRepository::new(store);

        let collection_id = collections
            .save(Collection::new("api"))
            .await
            .expect("save collection");
        let a = requests
            .save(Request::new("a", "GET", "https://t/a", collection_id))
            .await
            .expect("save request");
        let b = requests
            .save(Request::new("b", "GET", "https://t/b", collection_id))
            .await
            .expect("save request");

        repo.save(Preset::new("for-a", a)).await.expect("save");
        repo.save(Preset::new("for-b", b)).await.expect("save");

        assert_eq!(repo.list(Some(a)).await.len(), 1);
        assert_eq!(repo.list(None).await.len(), 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = open_store().await;
        let repo = PresetRepository::new(store);
        repo.delete(99999).await.expect("delete of unknown id succeeds");
    }
}
