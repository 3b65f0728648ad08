//! Global environment repository.

use std::sync::Arc;

use chrono::Utc;
use quiver_domain::Environment;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

/// CRUD and default-selection operations for global environments.
#[derive(Clone)]
pub struct EnvironmentRepository {
    store: Arc<DocumentStore>,
}

impl EnvironmentRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists all environments in storage order.
    pub async fn list(&self) -> Vec<Environment> {
        self.store.read().await.environments.clone()
    }

    /// Saves an environment. Without an id a new one is assigned; with
    /// an id the stored entity is replaced (its `lastUsed` is kept).
    /// Saving an environment with `isDefault` set clears the flag on
    /// every other environment in the same operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a persist
    /// error.
    pub async fn save(&self, mut environment: Environment) -> Result<i64, StoreError> {
        let event = StoreEvent::saved(EntityKind::Environment);
        match environment.id {
            Some(id) => {
                self.store
                    .mutate(event, |doc| {
                        let existing = doc
                            .environments
                            .iter_mut()
                            .find(|e| e.id == Some(id))
                            .ok_or_else(|| {
                                StoreError::NotFound(format!("environment {id}"))
                            })?;
                        environment.last_used = existing.last_used;
                        let make_default = environment.is_default;
                        *existing = environment;
                        if make_default {
                            for other in &mut doc.environments {
                                other.is_default = other.id == Some(id);
                            }
                        }
                        Ok(id)
                    })
                    .await
            }
            None => {
                let id = self.store.next_id();
                environment.id = Some(id);
                self.store
                    .mutate(event, move |doc| {
                        if environment.is_default {
                            for other in &mut doc.environments {
                                other.is_default = false;
                            }
                        }
                        doc.environments.push(environment);
                        Ok(id)
                    })
                    .await
            }
        }
    }

    /// Deletes an environment. Unknown ids succeed silently.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::deleted(EntityKind::Environment), |doc| {
                doc.environments.retain(|e| e.id != Some(id));
                Ok(())
            })
            .await
    }

    /// Returns the current default environment, if any.
    pub async fn get_current(&self) -> Option<Environment> {
        self.store
            .read()
            .await
            .environments
            .iter()
            .find(|e| e.is_default)
            .cloned()
    }

    /// Makes exactly one environment the default and refreshes its
    /// `lastUsed` timestamp, in one atomic operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a persist
    /// error.
    pub async fn set_current(&self, id: i64) -> Result<(), StoreError> {
        debug!(id, "selecting current environment");
        self.store
            .mutate(StoreEvent::saved(EntityKind::Environment), |doc| {
                if !doc.environments.iter().any(|e| e.id == Some(id)) {
                    return Err(StoreError::NotFound(format!("environment {id}")));
                }
                for env in &mut doc.environments {
                    env.is_default = env.id == Some(id);
                    if env.is_default {
                        env.last_used = Some(Utc::now());
                    }
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::test_util::open_store;
    use super::*;

    #[tokio::test]
    async fn save_assigns_distinct_ids() {
        let (_dir, store) = open_store().await;
        let repo = EnvironmentRepository::new(store);

        let a = repo.save(Environment::new("dev")).await.expect("save");
        let b = repo.save(Environment::new("prod")).await.expect("save");
        assert_ne!(a, b);
        assert_eq!(repo.list().await.len(), 2);
    }

    #[tokio::test]
    async fn set_current_clears_previous_default() {
        let (_dir, store) = open_store().await;
        let repo = EnvironmentRepository::new(store);

        let a = repo.save(Environment::new("dev")).await.expect("save");
        let b = repo.save(Environment::new("prod")).await.expect("save");

        repo.set_current(a).await.expect("set current");
        repo.set_current(b).await.expect("set current");

        let environments = repo.list().await;
        let defaults: Vec<i64> = environments
            .iter()
            .filter(|e| e.is_default)
            .filter_map(|e| e.id)
            .collect();
        assert_eq!(defaults, vec![b]);

        let current = repo.get_current().await.expect("current");
        assert!(current.last_used.is_some());
    }

    #[tokio::test]
    async fn set_current_unknown_id_errors() {
        let (_dir, store) = open_store().await;
        let repo = EnvironmentRepository::new(store);
        let result = repo.set_current(99999).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = open_store().await;
        let repo = EnvironmentRepository::new(store);
        repo.delete(99999).await.expect("delete of unknown id succeeds");
    }

    #[tokio::test]
    async fn update_preserves_last_used() {
        let (_dir, store) = open_store().await;
        let repo = EnvironmentRepository::new(store);

        let id = repo.save(Environment::new("dev")).await.expect("save");
        repo.set_current(id).await.expect("set current");

        let mut updated = Environment::new("dev-renamed");
        updated.id = Some(id);
        updated.is_default = true;
        repo.save(updated).await.expect("update");

        let current = repo.get_current().await.expect("current");
        assert_eq!(current.name, "dev-renamed");
        assert!(current.last_used.is_some());
    }
}
