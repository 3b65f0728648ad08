//! Draft request repository.
//!
//! Drafts live outside any collection. Promotion converts a draft into
//! a saved request at the tail of its target sibling group and removes
//! the draft, all in a single store mutation.

use std::sync::Arc;

use quiver_domain::{Document, UnsavedRequest};
use quiver_domain::request::ORDER_GAP;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

/// CRUD and promotion operations for draft requests.
#[derive(Clone)]
pub struct UnsavedRequestRepository {
    store: Arc<DocumentStore>,
}

impl UnsavedRequestRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists all drafts in storage order.
    pub async fn list(&self) -> Vec<UnsavedRequest> {
        self.store.read().await.unsaved_requests.clone()
    }

    /// Saves a draft. Without an id a new one is assigned; with an id
    /// the stored draft is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a persist
    /// error.
    pub async fn save(&self, mut draft: UnsavedRequest) -> Result<i64, StoreError> {
        let event = StoreEvent::saved(EntityKind::UnsavedRequest);
        match draft.id {
            Some(id) => {
                self.store
                    .mutate(event, |doc| {
                        let existing = doc
                            .unsaved_requests
                            .iter_mut()
                            .find(|d| d.id == Some(id))
                            .ok_or_else(|| StoreError::NotFound(format!("draft {id}")))?;
                        *existing = draft;
                        Ok(id)
                    })
                    .await
            }
            None => {
                let id = self.store.next_id();
                draft.id = Some(id);
                self.store
                    .mutate(event, move |doc| {
                        doc.unsaved_requests.push(draft);
                        Ok(id)
                    })
                    .await
            }
        }
    }

    /// Deletes a draft. Unknown ids succeed silently.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::deleted(EntityKind::UnsavedRequest), |doc| {
                doc.unsaved_requests.retain(|d| d.id != Some(id));
                Ok(())
            })
            .await
    }

    /// Deletes all drafts.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::deleted(EntityKind::UnsavedRequest), |doc| {
                doc.unsaved_requests.clear();
                Ok(())
            })
            .await
    }

    /// Promotes a draft into a saved request at the tail of the target
    /// collection/folder, removing the draft. Returns the new request
    /// id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown draft,
    /// [`StoreError::Validation`] when the target collection or folder
    /// does not exist (or the folder belongs to another collection), or
    /// a persist error.
    pub async fn promote(
        &self,
        id: i64,
        collection_id: i64,
        folder_id: Option<i64>,
    ) -> Result<i64, StoreError> {
        debug!(id, collection_id, "promoting draft into collection");
        let request_id = self.store.next_id();
        self.store
            .mutate(StoreEvent::saved(EntityKind::Request), move |doc| {
                check_target(doc, collection_id, folder_id)?;
                let position = doc
                    .unsaved_requests
                    .iter()
                    .position(|d| d.id == Some(id))
                    .ok_or_else(|| StoreError::NotFound(format!("draft {id}")))?;
                let draft = doc.unsaved_requests.remove(position);

                let tail = doc
                    .requests
                    .iter()
                    .filter(|r| r.is_sibling_of(collection_id, folder_id))
                    .filter_map(|r| r.order)
                    .fold(0.0_f64, f64::max)
                    + ORDER_GAP;

                let mut request = draft.into_request(collection_id, folder_id);
                request.id = Some(request_id);
                request.order = Some(tail);
                doc.requests.push(request);
                Ok(request_id)
            })
            .await
    }
}

fn check_target(
    doc: &Document,
    collection_id: i64,
    folder_id: Option<i64>,
) -> Result<(), StoreError> {
    if !doc.collections.iter().any(|c| c.id == Some(collection_id)) {
        return Err(StoreError::Validation(format!(
            "collection {collection_id} does not exist"
        )));
    }
    if let Some(folder_id) = folder_id {
        let belongs = doc
            .folders
            .iter()
            .any(|f| f.id == Some(folder_id) && f.collection_id == collection_id);
        if !belongs {
            return Err(StoreError::Validation(format!(
                "folder {folder_id} does not belong to collection {collection_id}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quiver_domain::{Collection, Request};

    use super::super::test_util::open_store;
    use super::*;
    use crate::persistence::{CollectionRepository, RequestFilter, RequestRepository};

    #[tokio::test]
    async fn promote_moves_draft_to_collection_tail() {
        let (_dir, store) = open_store().await;
        let collections = CollectionRepository::new(Arc::clone(&store));
        let requests = RequestRepository::new(Arc::clone(&store));
        let repo = UnsavedRequestRepository::new(store);

        let collection_id = collections
            .save(Collection::new("api"))
            .await
            .expect("save collection");
        requests
            .save(Request::new("existing", "GET", "https://t/a", collection_id))
            .await
            .expect("save request");

        let draft_id = repo
            .save(UnsavedRequest::new("Ping", "GET", "https://t/ping"))
            .await
            .expect("save draft");
        let request_id = repo
            .promote(draft_id, collection_id, None)
            .await
            .expect("promote");

        assert!(repo.list().await.is_empty());
        let saved = requests.list(RequestFilter::collection(collection_id)).await;
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].id, Some(request_id));
        assert_eq!(saved[1].name, "Ping");
        assert_eq!(saved[1].order, Some(2000.0));
    }

    #[tokio::test]
    async fn promote_rejects_missing_collection() {
        let (_dir, store) = open_store().await;
        let repo = UnsavedRequestRepository::new(store);

        let draft_id = repo
            .save(UnsavedRequest::new("Ping", "GET", "https://t/ping"))
            .await
            .expect("save draft");
        let result = repo.promote(draft_id, 12345, None).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(repo.list().await.len(), 1);
    }

    #[tokio::test]
    async fn promote_unknown_draft_errors() {
        let (_dir, store) = open_store().await;
        let collections = CollectionRepository::new(Arc::clone(&store));
        let repo = UnsavedRequestRepository::new(store);

        let collection_id = collections
            .save(Collection::new("api"))
            .await
            .expect("save collection");
        let result = repo.promote(99999, collection_id, None).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn clear_removes_all_drafts() {
        let (_dir, store) = open_store().await;
        let repo = UnsavedRequestRepository::new(store);

        repo.save(UnsavedRequest::new("a", "GET", "https://t/a"))
            .await
            .expect("save");
        repo.save(UnsavedRequest::new("b", "GET", "https://t/b"))
            .await
            .expect("save");
        repo.clear().await.expect("clear");
        assert!(repo.list().await.is_empty());
    }
}
