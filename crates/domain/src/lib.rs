//! Quiver Domain - Core business types
//!
//! This crate defines the persisted data model for the Quiver API Client.
//! All types here are pure Rust with no I/O dependencies; they map 1:1 to
//! the single JSON document the store keeps on disk.

pub mod collection;
pub mod document;
pub mod environment;
pub mod flag;
pub mod folder;
pub mod history;
pub mod request;
pub mod settings;

pub use collection::{Collection, CollectionEnvironment};
pub use document::Document;
pub use environment::Environment;
pub use folder::Folder;
pub use history::HistoryEntry;
pub use request::{Preset, QueryParam, Request, UnsavedRequest, sort_by_order};
pub use settings::{SettingsMap, default_settings};
