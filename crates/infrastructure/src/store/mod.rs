//! File-backed document store.
//!
//! The entire dataset is one JSON document. The store loads it into
//! memory on open, hands out shared read access, and funnels every
//! mutation through one critical section: acquire the write lock,
//! apply the change, rewrite the whole file. A mutation is complete
//! only once both the in-memory document and the on-disk mirror have
//! been updated; persist failure is reported but never rolls back the
//! in-memory change.

mod events;

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use quiver_domain::Document;
use tokio::fs;
use tokio::sync::{RwLock, RwLockReadGuard, broadcast};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::serialization::{from_json_slice, to_json_stable};

pub use events::{ChangeKind, EntityKind, StoreEvent};

/// Buffered events per subscriber before lagging ones drop messages.
const EVENT_CAPACITY: usize = 64;

/// The single source of truth for all persisted data.
pub struct DocumentStore {
    path: PathBuf,
    document: RwLock<Document>,
    next_id: AtomicI64,
    events: broadcast::Sender<StoreEvent>,
}

impl DocumentStore {
    /// Opens the store at `path`, parsing the existing document or
    /// initializing an empty one (with default settings) when the file
    /// does not exist. The id counter is seeded past the highest id in
    /// the loaded document so fresh ids never collide.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or
    /// parsed, or if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let document = match fs::read(&path).await {
            Ok(bytes) => from_json_slice(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let next_id = AtomicI64::new(document.max_id() + 1);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        debug!(path = %path.display(), "document store opened");
        Ok(Self {
            path,
            document: RwLock::new(document),
            next_id,
            events,
        })
    }

    /// Returns shared read access to the live document. Readers never
    /// observe a partially applied mutation.
    pub async fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read().await
    }

    /// Generates a fresh id. Monotonic for the process lifetime: ids
    /// are never reused, even after deletion.
    pub fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Subscribes to mutation events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Applies a mutation and persists the full document.
    ///
    /// The closure runs under the exclusive write lock; returning an
    /// error from it abandons the mutation without persisting. The
    /// event is published only after the persist succeeds.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error, or [`StoreError::Io`] /
    /// [`StoreError::Serialization`] when persisting fails.
    pub async fn mutate<T>(
        &self,
        event: StoreEvent,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut document = self.document.write().await;
        let value = f(&mut document)?;
        self.persist(&document).await?;
        drop(document);

        // No subscribers is not an error.
        let _ = self.events.send(event);
        Ok(value)
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let json =
            to_json_stable(document).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let Err(e) = fs::write(&self.path, json).await {
            warn!(path = %self.path.display(), error = %e, "failed to persist document");
            return Err(StoreError::Io(e));
        }
        Ok(())
    }
}
