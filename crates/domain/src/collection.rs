//! Collection model.
//!
//! A collection groups requests and folders, and may carry its own
//! embedded environments scoped to that collection only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named group of requests and folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Store-assigned identifier. `None` for an entity not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Collection name.
    pub name: String,

    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-form documentation (markdown in the UI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    /// Whether the collection is pinned as a favorite.
    /// Persisted as `0`/`1` for on-disk compatibility.
    #[serde(default, with = "crate::flag")]
    pub is_favorite: bool,

    /// Environments owned exclusively by this collection.
    #[serde(default)]
    pub environments: Vec<CollectionEnvironment>,

    /// Id of the active entry in `environments`, if any.
    /// Must reference an embedded environment or be absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_environment_id: Option<i64>,
}

impl Collection {
    /// Creates an unsaved collection with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            documentation: None,
            is_favorite: false,
            environments: Vec::new(),
            active_environment_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the active embedded environment, if one is selected.
    #[must_use]
    pub fn active_environment(&self) -> Option<&CollectionEnvironment> {
        let active_id = self.active_environment_id?;
        self.environments.iter().find(|e| e.id == active_id)
    }
}

/// An environment owned by a single collection. Has no independent
/// lifecycle: it is created, updated, and deleted through its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEnvironment {
    /// Store-assigned identifier, unique across the whole document.
    pub id: i64,

    /// Environment name, unique within the collection in practice.
    pub name: String,

    /// Variable bindings resolved at collection precedence.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}
