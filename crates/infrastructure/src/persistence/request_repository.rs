//! Request repository.
//!
//! Owns the order-field management: tail placement for new requests and
//! midpoint insertion for `save_after`, so repeated inserts never
//! require renumbering a sibling list.

use std::sync::Arc;

use quiver_domain::request::ORDER_GAP;
use quiver_domain::{Document, Request, sort_by_order};

use crate::error::StoreError;
use crate::store::{DocumentStore, EntityKind, StoreEvent};

/// Filter for request listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Restrict to one collection.
    pub collection_id: Option<i64>,

    /// Restrict to one folder.
    pub folder_id: Option<i64>,
}

impl RequestFilter {
    /// Filter matching every request of a collection.
    #[must_use]
    pub const fn collection(collection_id: i64) -> Self {
        Self {
            collection_id: Some(collection_id),
            folder_id: None,
        }
    }

    fn matches(&self, request: &Request) -> bool {
        self.collection_id.is_none_or(|id| request.collection_id == id)
            && self.folder_id.is_none_or(|id| request.folder_id == Some(id))
    }
}

/// Next order value for a new tail entry among the given siblings.
fn tail_order(doc: &Document, collection_id: i64, folder_id: Option<i64>) -> f64 {
    doc.requests
        .iter()
        .filter(|r| r.is_sibling_of(collection_id, folder_id))
        .filter_map(|r| r.order)
        .fold(0.0_f64, f64::max)
        + ORDER_GAP
}

fn check_collection(doc: &Document, collection_id: i64) -> Result<(), StoreError> {
    if doc.collections.iter().any(|c| c.id == Some(collection_id)) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "collection {collection_id} does not exist"
        )))
    }
}

/// CRUD and ordering operations for saved requests.
#[derive(Clone)]
pub struct RequestRepository {
    store: Arc<DocumentStore>,
}

impl RequestRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Lists requests matching the filter, sorted by (order, id).
    pub async fn list(&self, filter: RequestFilter) -> Vec<Request> {
        let mut requests: Vec<Request> = self
            .store
            .read()
            .await
            .requests
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        sort_by_order(&mut requests);
        requests
    }

    /// Saves a request. A new request without an explicit order is
    /// placed after the last sibling; an update without an explicit
    /// order keeps its stored position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when `collectionId` does not
    /// reference an existing collection, [`StoreError::NotFound`] for
    /// an unknown request id, or a persist error.
    pub async fn save(&self, mut request: Request) -> Result<i64, StoreError> {
        let event = StoreEvent::saved(EntityKind::Request);
        match request.id {
            Some(id) => {
                self.store
                    .mutate(event, |doc| {
                        check_collection(doc, request.collection_id)?;
                        let position = doc
                            .requests
                            .iter()
                            .position(|r| r.id == Some(id))
                            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;
                        if request.order.is_none() {
                            request.order = doc.requests[position].order;
                        }
                        doc.requests[position] = request;
                        Ok(id)
                    })
                    .await
            }
            None => {
                let id = self.store.next_id();
                self.store
                    .mutate(event, move |doc| Self::insert(doc, request, id))
                    .await
            }
        }
    }

    /// Saves a request positioned directly after `after_id`. The
    /// request adopts the sibling group (collection and folder) of
    /// `after_id` and receives an order value strictly between it and
    /// the next sibling, or past the end when `after_id` is last.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when `after_id` does not exist,
    /// or a persist error.
    pub async fn save_after(&self, mut request: Request, after_id: i64) -> Result<i64, StoreError> {
        let id = match request.id {
            Some(id) => id,
            None => self.store.next_id(),
        };
        self.store
            .mutate(StoreEvent::saved(EntityKind::Request), move |doc| {
                let after = doc
                    .requests
                    .iter()
                    .find(|r| r.id == Some(after_id))
                    .ok_or_else(|| StoreError::NotFound(format!("request {after_id}")))?
                    .clone();

                let mut siblings: Vec<Request> = doc
                    .requests
                    .iter()
                    .filter(|r| {
                        r.is_sibling_of(after.collection_id, after.folder_id)
                            && r.id != Some(id)
                    })
                    .cloned()
                    .collect();
                sort_by_order(&mut siblings);

                let position = siblings.iter().position(|r| r.id == Some(after_id));
                let after_order = after.order.unwrap_or(0.0);
                let next_order = position
                    .and_then(|p| siblings.get(p + 1))
                    .and_then(|next| next.order);

                request.collection_id = after.collection_id;
                request.folder_id = after.folder_id;
                request.order = Some(match next_order {
                    Some(next) => f64::midpoint(after_order, next),
                    None => after_order + ORDER_GAP,
                });

                Self::upsert(doc, request, id)
            })
            .await
    }

    /// Deletes a request and its presets. Unknown ids succeed silently.
    ///
    /// # Errors
    ///
    /// Returns a persist error.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.store
            .mutate(StoreEvent::deleted(EntityKind::Request), |doc| {
                doc.requests.retain(|r| r.id != Some(id));
                doc.presets.retain(|p| p.request_id != id);
                Ok(())
            })
            .await
    }

    /// Inserts a new request under a freshly allocated id.
    fn insert(doc: &mut Document, mut request: Request, id: i64) -> Result<i64, StoreError> {
        check_collection(doc, request.collection_id)?;
        if request.order.is_none() {
            request.order = Some(tail_order(doc, request.collection_id, request.folder_id));
        }
        request.id = Some(id);
        doc.requests.push(request);
        Ok(id)
    }

    /// Inserts or replaces a request under a pre-allocated id. Only
    /// `save_after` takes the insert path here: its id is either the
    /// moved request's own or came from `next_id`, never caller-chosen.
    fn upsert(doc: &mut Document, mut request: Request, id: i64) -> Result<i64, StoreError> {
        if let Some(position) = doc.requests.iter().position(|r| r.id == Some(id)) {
            check_collection(doc, request.collection_id)?;
            if request.order.is_none() {
                request.order = doc.requests[position].order;
            }
            request.id = Some(id);
            doc.requests[position] = request;
            Ok(id)
        } else {
            Self::insert(doc, request, id)
        }
    }
}
