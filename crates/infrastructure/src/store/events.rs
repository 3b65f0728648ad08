//! Store mutation events.
//!
//! Subscribers (the UI bridge, caches) learn about mutations through a
//! broadcast channel decoupled from the store's mutation path. Events
//! fire only after a successful persist; lagging subscribers drop
//! events, they never block writers.

use serde::Serialize;

/// Which top-level document section changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    /// Global environments.
    Environment,
    /// Collections, including their embedded environments.
    Collection,
    /// Folders.
    Folder,
    /// Saved requests.
    Request,
    /// Execution history.
    History,
    /// Draft requests.
    UnsavedRequest,
    /// Presets.
    Preset,
    /// The settings map.
    Settings,
}

/// How the section changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    /// An entity was created or updated.
    Saved,
    /// An entity was removed (possibly with cascades).
    Deleted,
}

/// One mutation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreEvent {
    /// Affected document section.
    pub entity: EntityKind,

    /// Kind of change.
    pub change: ChangeKind,
}

impl StoreEvent {
    /// Shorthand for a save event.
    #[must_use]
    pub const fn saved(entity: EntityKind) -> Self {
        Self {
            entity,
            change: ChangeKind::Saved,
        }
    }

    /// Shorthand for a delete event.
    #[must_use]
    pub const fn deleted(entity: EntityKind) -> Self {
        Self {
            entity,
            change: ChangeKind::Deleted,
        }
    }
}
