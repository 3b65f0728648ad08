//! Folder model: a sub-grouping of requests within a collection.

use serde::{Deserialize, Serialize};

/// A sub-grouping of requests within one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Store-assigned identifier. `None` for an entity not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Folder name.
    pub name: String,

    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning collection. Must reference an existing collection.
    pub collection_id: i64,
}

impl Folder {
    /// Creates an unsaved folder inside the given collection.
    #[must_use]
    pub fn new(name: impl Into<String>, collection_id: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            collection_id,
        }
    }
}
