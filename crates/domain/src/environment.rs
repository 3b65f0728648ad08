//! Global environment model.
//!
//! A global environment is a named set of variables selectable app-wide.
//! At most one environment is the default at any time; the repository
//! enforces that invariant on `set_current`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named set of key/value variables selectable app-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Store-assigned identifier. `None` for an entity not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Unique environment name.
    pub name: String,

    /// Human-readable label shown in the environment picker.
    #[serde(default)]
    pub display_name: String,

    /// Variable bindings resolved at lowest precedence.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    /// Whether this is the app-wide default environment.
    /// Persisted as `0`/`1` for on-disk compatibility.
    #[serde(default, with = "crate::flag")]
    pub is_default: bool,

    /// When this environment was last selected as current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl Environment {
    /// Creates an unsaved environment with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: None,
            display_name: name.clone(),
            name,
            variables: BTreeMap::new(),
            is_default: false,
            last_used: None,
        }
    }

    /// Adds a variable binding.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}
