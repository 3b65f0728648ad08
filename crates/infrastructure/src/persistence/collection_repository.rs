//! Collection repository.
//!
//! Owns the cascade-delete rules and all operations on a collection's
//! embedded environments.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;

use quiver_domain::{Collection, CollectionEnvironment};
use tracing::debug;

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

/// Validates that `active_environment_id` references an embedded entry.
fn check_active_reference(collection: &Collection) -> Result<(), StoreError> {
    if let Some(active_id) = collection.active_environment_id {
        if !collection.environments.iter().any(|e| e.id == active_id) {
            return Err(StoreError::Validation(format!(
                "environment {active_id} does not belong to the collection"
            )));
        }
    }
    Ok(())
}

/// CRUD, favorite, and embedded-environment operations for collections.
#[derive(Clone)]
pub struct CollectionRepository {
    store: Arc<DocumentStore>,
}

impl CollectionRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists all collections in storage order.
    pub async fn list(&self) -> Vec<Collection> {
        self.store.read().await.collections.clone()
    }

    /// Loads one collection by id.
    pub async fn get(&self, id: i64) -> Option<Collection> {
        self.store
            .read()
            .await
            .collections
            .iter()
            .find(|c| c.id == Some(id))
            .cloned()
    }

    /// Saves a collection. Without an id a new one is assigned; with an
    /// id the stored entity is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id,
    /// [`StoreError::Validation`] when `activeEnvironmentId` does not
    /// reference an embedded environment, or a persist error.
    pub async fn save(&self, mut collection: Collection) -> Result<i64, StoreError> {
        check_active_reference(&collection)?;
        let event = StoreEvent::saved(EntityKind::Collection);
        match collection.id {
            Some(id) => {
                self.store
                    .mutate(event, |doc| {
                        let existing = doc
                            .collections
                            .iter_mut()
                            .find(|c| c.id == Some(id))
                            .ok_or_else(|| {
                                StoreError::NotFound(format!("collection {id}"))
                            })?;
                        *existing = collection;
                        Ok(id)
                    })
                    .await
            }
            None => {
                let id = self.store.next_id();
                collection.id = Some(id);
                self.store
                    .mutate(event, move |doc| {
                        doc.collections.push(collection);
                        Ok(id)
                    })
                    .await
            }
        }
    }

    /// Deletes a collection and everything it owns: its folders, every
    /// request placed in it or in one of its folders, and the presets
    /// of those requests. Unknown ids succeed silently.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        debug!(id, "deleting collection with cascade");
        self.store
            .mutate(StoreEvent::deleted(EntityKind::Collection), |doc| {
                let folder_ids: HashSet<i64> = doc
                    .folders
                    .iter()
                    .filter(|f| f.collection_id == id)
                    .filter_map(|f| f.id)
                    .collect();

                let removed_requests: HashSet<i64> = doc
                    .requests
                    .iter()
                    .filter(|r| {
                        r.collection_id == id
                            || r.folder_id.is_some_and(|f| folder_ids.contains(&f))
                    })
                    .filter_map(|r| r.id)
                    .collect();

                doc.requests.retain(|r| {
                    !(r.collection_id == id
                        || r.folder_id.is_some_and(|f| folder_ids.contains(&f)))
                });
                doc.presets.retain(|p| !removed_requests.contains(&p.request_id));
                doc.folders.retain(|f| f.collection_id != id);
                doc.collections.retain(|c| c.id != Some(id));
                Ok(())
            })
            .await
    }

    /// Flips the favorite flag and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a persist
    /// error.
    pub async fn toggle_favorite(&self, id: i64) -> Result<bool, StoreError> {
        self.store
            .mutate(StoreEvent::saved(EntityKind::Collection), |doc| {
                let collection = doc
                    .collections
                    .iter_mut()
                    .find(|c| c.id == Some(id))
                    .ok_or_else(|| StoreError::NotFound(format!("collection {id}")))?;
                collection.is_favorite = !collection.is_favorite;
                Ok(collection.is_favorite)
            })
            .await
    }

    /// Selects (or clears, with `None`) the active embedded environment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown collection,
    /// [`StoreError::Validation`] when the environment is not embedded
    /// in it, or a persist error.
    pub async fn set_active_environment(
        &self,
        collection_id: i64,
        environment_id: Option<i64>,
    ) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::saved(EntityKind::Collection), |doc| {
                let collection = doc
                    .collections
                    .iter_mut()
                    .find(|c| c.id == Some(collection_id))
                    .ok_or_else(|| {
                        StoreError::NotFound(format!("collection {collection_id}"))
                    })?;
                collection.active_environment_id = environment_id;
                check_active_reference(collection)?;
                Ok(())
            })
            .await
    }

    /// Adds an embedded environment and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown collection, or a
    /// persist error.
    pub async fn add_environment(
        &self,
        collection_id: i64,
        name: impl Into<String>,
        variables: BTreeMap<String, String>,
    ) -> Result<i64, StoreError> {
        let id = self.store.next_id();
        let environment = CollectionEnvironment {
            id,
            name: name.into(),
            variables,
        };
        self.store
            .mutate(StoreEvent::saved(EntityKind::Collection), move |doc| {
                let collection = doc
                    .collections
                    .iter_mut()
                    .find(|c| c.id == Some(collection_id))
                    .ok_or_else(|| {
                        StoreError::NotFound(format!("collection {collection_id}"))
                    })?;
                collection.environments.push(environment);
                Ok(id)
            })
            .await
    }

    /// Replaces an embedded environment by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the collection or the
    /// embedded environment does not exist, or a persist error.
    pub async fn update_environment(
        &self,
        collection_id: i64,
        environment: CollectionEnvironment,
    ) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::saved(EntityKind::Collection), |doc| {
                let collection = doc
                    .collections
                    .iter_mut()
                    .find(|c| c.id == Some(collection_id))
                    .ok_or_else(|| {
                        StoreError::NotFound(format!("collection {collection_id}"))
                    })?;
                let existing = collection
                    .environments
                    .iter_mut()
                    .find(|e| e.id == environment.id)
                    .ok_or_else(|| {
                        StoreError::NotFound(format!(
                            "collection environment {}",
                            environment.id
                        ))
                    })?;
                *existing = environment;
                Ok(())
            })
            .await
    }

    /// Removes an embedded environment. When the removed entry was
    /// active, the first remaining environment becomes active, or no
    /// environment when none remain. Unknown environment ids succeed
    /// silently.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown collection, or a
    /// persist error.
    pub async fn delete_environment(
        &self,
        collection_id: i64,
        environment_id: i64,
    ) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::saved(EntityKind::Collection), |doc| {
                let collection = doc
                    .collections
                    .iter_mut()
                    .find(|c| c.id == Some(collection_id))
                    .ok_or_else(|| {
                        StoreError::NotFound(format!("collection {collection_id}"))
                    })?;
                collection.environments.retain(|e| e.id != environment_id);
                if collection.active_environment_id == Some(environment_id) {
                    collection.active_environment_id =
                        collection.environments.first().map(|e| e.id);
                }
                Ok(())
            })
            .await
    }
}
