//! Storage port consumed by the runner.
//!
//! The runner reads collections, requests, and environments and writes
//! history entries. It never mutates anything else, so the port is kept
//! to exactly that surface.

use async_trait::async_trait;
use quiver_domain::{Collection, Environment, HistoryEntry, Request};

use crate::ApplicationResult;

/// Read/write access the collection runner needs.
#[async_trait]
pub trait RunnerStorage: Send + Sync {
    /// Loads a collection by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn collection(&self, id: i64) -> ApplicationResult<Option<Collection>>;

    /// Loads a single request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn request(&self, id: i64) -> ApplicationResult<Option<Request>>;

    /// Lists all requests belonging to a collection, regardless of
    /// folder placement. Order is storage order; the runner sorts.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn requests_in_collection(&self, collection_id: i64) -> ApplicationResult<Vec<Request>>;

    /// Loads a global environment by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn environment(&self, id: i64) -> ApplicationResult<Option<Environment>>;

    /// Returns the default global environment, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn default_environment(&self) -> ApplicationResult<Option<Environment>>;

    /// Returns the configured per-request timeout in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn request_timeout_ms(&self) -> ApplicationResult<u64>;

    /// Appends a history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    async fn record_history(&self, entry: HistoryEntry) -> ApplicationResult<i64>;
}
