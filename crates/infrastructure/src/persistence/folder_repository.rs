//! Folder repository.

use std::collections::HashSet;
use std::sync::Arc;

use quiver_domain::Folder;

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

/// CRUD operations for folders.
#[derive(Clone)]
pub struct FolderRepository {
    store: Arc<DocumentStore>,
}

impl FolderRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists folders, optionally filtered by collection.
    pub async fn list(&self, collection_id: Option<i64>) -> Vec<Folder> {
        self.store
            .read()
            .await
            .folders
            .iter()
            .filter(|f| collection_id.is_none_or(|id| f.collection_id == id))
            .cloned()
            .collect()
    }

    /// Saves a folder. The owning collection must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when `collectionId` does not
    /// reference an existing collection, [`StoreError::NotFound`] for
    /// an unknown folder id, or a persist error.
    pub async fn save(&self, mut folder: Folder) -> Result<i64, StoreError> {
        let event = StoreEvent::saved(EntityKind::Folder);
        match folder.id {
            Some(id) => {
                self.store
                    .mutate(event, |doc| {
                        check_collection(doc, folder.collection_id)?;
                        let existing = doc
                            .folders
                            .iter_mut()
                            .find(|f| f.id == Some(id))
                            .ok_or_else(|| StoreError::NotFound(format!("folder {id}")))?;
                        *existing = folder;
                        Ok(id)
                    })
                    .await
            }
            None => {
                let id = self.store.next_id();
                folder.id = Some(id);
                self.store
                    .mutate(event, move |doc| {
                        check_collection(doc, folder.collection_id)?;
                        doc.folders.push(folder);
                        Ok(id)
                    })
                    .await
            }
        }
    }

    /// Deletes a folder and every request placed in it (plus their
    /// presets). Unknown ids succeed silently.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::deleted(EntityKind::Folder), |doc| {
                let removed_requests: HashSet<i64> = doc
                    .requests
                    .iter()
                    .filter(|r| r.folder_id == Some(id))
                    .filter_map(|r| r.id)
                    .collect();

                doc.requests.retain(|r| r.folder_id != Some(id));
                doc.presets.retain(|p| !removed_requests.contains(&p.request_id));
                doc.folders.retain(|f| f.id != Some(id));
                Ok(())
            })
            .await
    }
}

fn check_collection(doc: &quiver_domain::Document, collection_id: i64) -> Result<(), StoreError> {
    if doc.collections.iter().any(|c| c.id == Some(collection_id)) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "collection {collection_id} does not exist"
        )))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quiver_domain::Collection;

    use super::super::test_util::open_store;
    use super::*;
    use crate::persistence::CollectionRepository;

    #[tokio::test]
    async fn save_requires_existing_collection() {
        let (_dir, store) = open_store().await;
        let repo = FolderRepository::new(store);

        let result = repo.save(Folder::new("Users", 12345)).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn list_filters_by_collection() {
        let (_dir, store) = open_store().await;
        let collections = CollectionRepository::new(Arc::clone(&store));
        let repo = FolderRepository::new(store);

        let a = collections.save(Collection::new("a")).await.expect("save");
        let b = collections.save(Collection::new("b")).await.expect("save");
        repo.save(Folder::new("in-a", a)).await.expect("save");
        repo.save(Folder::new("in-b", b)).await.expect("save");

        assert_eq!(repo.list(Some(a)).await.len(), 1);
        assert_eq!(repo.list(None).await.len(), 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = open_store().await;
        let repo = FolderRepository::new(store);
        repo.delete(99999).await.expect("delete of unknown id succeeds");
    }
}
