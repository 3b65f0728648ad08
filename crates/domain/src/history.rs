//! Request history model.
//!
//! History entries are append-only and have an independent lifecycle:
//! deleting a request does not remove its history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded request execution.
///
/// Field naming on disk is camelCase except `response_time` and
/// `response_body`, which historic documents store in snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Store-assigned identifier. `None` for an entity not yet saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// HTTP verb that was sent.
    pub method: String,

    /// Fully resolved URL that was sent.
    pub url: String,

    /// Response status code.
    pub status: u16,

    /// Round-trip time in milliseconds.
    #[serde(rename = "response_time")]
    pub response_time: u64,

    /// Response body, possibly truncated by the caller.
    #[serde(rename = "response_body", default)]
    pub response_body: String,

    /// Response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// When the request was executed.
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an unsaved entry timestamped now.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>, status: u16) -> Self {
        Self {
            id: None,
            method: method.into(),
            url: url.into(),
            status,
            response_time: 0,
            response_body: String::new(),
            headers: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }
}
