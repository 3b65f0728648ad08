//! The persisted document aggregate.
//!
//! The entire dataset lives in one JSON object; the store loads it into
//! memory at startup and rewrites the whole file on every mutation.

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::environment::Environment;
use crate::folder::Folder;
use crate::history::HistoryEntry;
use crate::request::{Preset, Request, UnsavedRequest};
use crate::settings::{SettingsMap, default_settings};

/// The full on-disk document. Top-level keys are snake_case; entity
/// fields follow the per-entity serde conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Global environments.
    #[serde(default)]
    pub environments: Vec<Environment>,

    /// Collections, each with its embedded environments.
    #[serde(default)]
    pub collections: Vec<Collection>,

    /// Folders across all collections.
    #[serde(default)]
    pub folders: Vec<Folder>,

    /// Saved requests across all collections.
    #[serde(default)]
    pub requests: Vec<Request>,

    /// Append-only execution history.
    #[serde(default)]
    pub request_history: Vec<HistoryEntry>,

    /// Drafts not yet attached to a collection.
    #[serde(default)]
    pub unsaved_requests: Vec<UnsavedRequest>,

    /// Named request override snapshots.
    #[serde(default)]
    pub presets: Vec<Preset>,

    /// Flat settings map.
    #[serde(default = "default_settings")]
    pub settings: SettingsMap,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            environments: Vec::new(),
            collections: Vec::new(),
            folders: Vec::new(),
            requests: Vec::new(),
            request_history: Vec::new(),
            unsaved_requests: Vec::new(),
            presets: Vec::new(),
            settings: default_settings(),
        }
    }
}

impl Document {
    /// Returns the highest id present anywhere in the document,
    /// including ids of embedded collection environments. Used to seed
    /// the id counter so fresh ids never collide with loaded data.
    #[must_use]
    pub fn max_id(&self) -> i64 {
        let mut max = 0;
        let mut track = |id: Option<i64>| {
            if let Some(id) = id {
                max = max.max(id);
            }
        };

        for env in &self.environments {
            track(env.id);
        }
        for collection in &self.collections {
            track(collection.id);
            for embedded in &collection.environments {
                track(Some(embedded.id));
            }
        }
        for folder in &self.folders {
            track(folder.id);
        }
        for request in &self.requests {
            track(request.id);
        }
        for entry in &self.request_history {
            track(entry.id);
        }
        for draft in &self.unsaved_requests {
            track(draft.id);
        }
        for preset in &self.presets {
            track(preset.id);
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::collection::CollectionEnvironment;
    use crate::settings::keys;

    #[test]
    fn empty_document_carries_default_settings() {
        let document = Document::default();
        assert!(document.environments.is_empty());
        assert!(document.settings.contains_key(keys::THEME));
    }

    #[test]
    fn deserializes_missing_sections() {
        let document: Document = serde_json::from_str("{}").expect("deserialize");
        assert!(document.collections.is_empty());
        assert_eq!(
            document.settings.get(keys::DEFAULT_METHOD),
            Some(&serde_json::json!("GET"))
        );
    }

    #[test]
    fn max_id_scans_embedded_environments() {
        let mut document = Document::default();
        let mut env = Environment::new("dev");
        env.id = Some(3);
        document.environments.push(env);

        let mut collection = Collection::new("api");
        collection.id = Some(4);
        collection.environments.push(CollectionEnvironment {
            id: 17,
            name: "sandbox".to_string(),
            variables: std::collections::BTreeMap::new(),
        });
        document.collections.push(collection);

        assert_eq!(document.max_id(), 17);
    }

    #[test]
    fn max_id_of_empty_document_is_zero() {
        assert_eq!(Document::default().max_id(), 0);
    }
}
