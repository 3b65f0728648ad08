//! Settings repository.
//!
//! Reads overlay stored values on top of the documented defaults, so a
//! key never read back as missing just because the user kept the
//! default.

use std::sync::Arc;

use quiver_domain::settings::{SettingsMap, default_settings};
use serde_json::Value;

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

/// Read/write access to the flat settings map.
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<DocumentStore>,
}

impl SettingsRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Reads one setting, falling back to its documented default. An
    /// unknown key without a default yields `None`.
    pub async fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.store.read().await.settings.get(key) {
            return Some(value.clone());
        }
        default_settings().remove(key)
    }

    /// Returns the full settings map: defaults overlaid with every
    /// stored value, including user-defined keys.
    pub async fn get_all(&self) -> SettingsMap {
        let mut settings = default_settings();
        for (key, value) in &self.store.read().await.settings {
            settings.insert(key.clone(), value.clone());
        }
        settings
    }

    /// Stores one setting. Keys outside the documented set are allowed.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let key = key.to_string();
        self.store
            .mutate(StoreEvent::saved(EntityKind::Settings), move |doc| {
                doc.settings.insert(key, value);
                Ok(())
            })
            .await
    }

    /// Restores every setting to its default, discarding user-defined
    /// keys.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::saved(EntityKind::Settings), |doc| {
                doc.settings = default_settings();
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quiver_domain::settings::keys;
    use serde_json::json;

    use super::super::test_util::open_store;
    use super::*;

    #[tokio::test]
    async fn get_falls_back_to_defaults() {
        let (_dir, store) = open_store().await;
        let repo = SettingsRepository::new(store);

        assert_eq!(repo.get(keys::THEME).await, Some(json!("system")));
        assert_eq!(repo.get("no-such-key").await, None);
    }

    #[tokio::test]
    async fn set_overrides_and_reset_restores() {
        let (_dir, store) = open_store().await;
        let repo = SettingsRepository::new(store);

        repo.set(keys::THEME, json!("dark")).await.expect("set");
        repo.set("custom.flag", json!(true)).await.expect("set");
        assert_eq!(repo.get(keys::THEME).await, Some(json!("dark")));

        let all = repo.get_all().await;
        assert_eq!(all.get("custom.flag"), Some(&json!(true)));
        assert_eq!(all.get(keys::DEFAULT_METHOD), Some(&json!("GET")));

        repo.reset().await.expect("reset");
        assert_eq!(repo.get(keys::THEME).await, Some(json!("system")));
        assert_eq!(repo.get("custom.flag").await, None);
    }
}
