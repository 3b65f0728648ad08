//! Request models: saved requests, drafts, presets, and query parameters.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Gap between consecutive order values when appending at the tail.
/// Leaves room for midpoint insertion without renumbering siblings.
pub const ORDER_GAP: f64 = 1000.0;

/// A single query string parameter. Disabled parameters are kept in the
/// document but never appended to the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// Parameter name.
    pub key: String,

    /// Parameter value. May contain `{{variable}}` placeholders.
    pub value: String,

    /// Whether the parameter is appended when the request is sent.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl QueryParam {
    /// Creates an enabled parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a disabled parameter.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: false,
        }
    }
}

/// A saved HTTP request belonging to a collection.
///
/// The method is stored as a free-form string: the document may contain
/// verbs the execution adapter does not support, and those must surface
/// as a per-request failure at run time rather than a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Store-assigned identifier. `None` for an entity not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Request name.
    pub name: String,

    /// HTTP verb, uppercase by convention.
    pub method: String,

    /// Target URL. May contain `{{variable}}` placeholders.
    pub url: String,

    /// Request headers. Values may contain placeholders.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, if any. May contain placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Ordered query parameters.
    #[serde(default)]
    pub query_params: Vec<QueryParam>,

    /// Opaque auth configuration carried through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// Owning collection.
    pub collection_id: i64,

    /// Owning folder within the collection, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,

    /// Whether the request is pinned as a favorite.
    /// Persisted as `0`/`1` for on-disk compatibility.
    #[serde(default, with = "crate::flag")]
    pub is_favorite: bool,

    /// Numeric sort key among siblings sharing the same
    /// collection/folder. Not necessarily contiguous. Assigned by the
    /// repository when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl Request {
    /// Creates an unsaved request in the given collection.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
        collection_id: i64,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            query_params: Vec::new(),
            auth: None,
            collection_id,
            folder_id: None,
            is_favorite: false,
            order: None,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the explicit order value.
    #[must_use]
    pub const fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns true when this request sits directly under `folder_id`
    /// (or at the collection root when `folder_id` is `None`).
    #[must_use]
    pub fn is_sibling_of(&self, collection_id: i64, folder_id: Option<i64>) -> bool {
        self.collection_id == collection_id && self.folder_id == folder_id
    }
}

/// Sorts requests by (order ascending, id ascending). Requests without
/// an order value sort first; ids default to 0 for unsaved entries.
pub fn sort_by_order(requests: &mut [Request]) {
    requests.sort_by(|a, b| {
        let by_order = a
            .order
            .unwrap_or(f64::NEG_INFINITY)
            .partial_cmp(&b.order.unwrap_or(f64::NEG_INFINITY))
            .unwrap_or(Ordering::Equal);
        by_order.then_with(|| a.id.unwrap_or(0).cmp(&b.id.unwrap_or(0)))
    });
}

/// A draft request not yet attached to a collection. Promoting a draft
/// converts it into a [`Request`] and deletes the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsavedRequest {
    /// Store-assigned identifier. `None` for an entity not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Draft name.
    pub name: String,

    /// HTTP verb.
    pub method: String,

    /// Target URL.
    pub url: String,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Ordered query parameters.
    #[serde(default)]
    pub query_params: Vec<QueryParam>,

    /// Opaque auth configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl UnsavedRequest {
    /// Creates a new draft.
    #[must_use]
    pub fn new(name: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            query_params: Vec::new(),
            auth: None,
        }
    }

    /// Converts the draft into a request placed in the given collection.
    #[must_use]
    pub fn into_request(self, collection_id: i64, folder_id: Option<i64>) -> Request {
        Request {
            id: None,
            name: self.name,
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            query_params: self.query_params,
            auth: self.auth,
            collection_id,
            folder_id,
            is_favorite: false,
            order: None,
        }
    }
}

/// A named snapshot of request overrides, owned by a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Store-assigned identifier. `None` for an entity not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Owning request.
    pub request_id: i64,

    /// Preset name.
    pub name: String,

    /// Header overrides.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Body override, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Query parameter overrides.
    #[serde(default)]
    pub query_params: Vec<QueryParam>,
}

impl Preset {
    /// Creates an unsaved preset for the given request.
    #[must_use]
    pub fn new(name: impl Into<String>, request_id: i64) -> Self {
        Self {
            id: None,
            request_id,
            name: name.into(),
            headers: BTreeMap::new(),
            body: None,
            query_params: Vec::new(),
        }
    }
}
