//! Response envelopes for host-facing operations.
//!
//! Every operation answers with a uniform envelope so the host can
//! branch on `success` without inspecting operation-specific shapes.

use quiver_application::runner::{RunOutcome, RunnerError};
use serde::Serialize;

/// Envelope for mutations. Carries the affected entity id on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpResponse {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Id of the affected entity, when the operation produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Failure description for unsuccessful operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpResponse {
    /// Successful mutation without an id.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            id: None,
            error: None,
        }
    }

    /// Successful mutation affecting the given id.
    #[must_use]
    pub const fn ok_id(id: i64) -> Self {
        Self {
            success: true,
            id: Some(id),
            error: None,
        }
    }

    /// Failed mutation.
    #[must_use]
    pub fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.to_string()),
        }
    }

    /// Collapses a fallible mutation into an envelope.
    pub fn from_result<E: ToString>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::err(e),
        }
    }

    /// Collapses a fallible id-returning mutation into an envelope.
    pub fn from_id_result<E: ToString>(result: Result<i64, E>) -> Self {
        match result {
            Ok(id) => Self::ok_id(id),
            Err(e) => Self::err(e),
        }
    }
}

/// Envelope for queries. Carries the payload on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Payload for successful queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Failure description for unsuccessful queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> DataResponse<T> {
    /// Successful query.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed query.
    #[must_use]
    pub fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    /// Collapses a fallible query into an envelope.
    pub fn from_result<E: ToString>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e),
        }
    }
}

/// Envelope for collection runs. A structural failure (unknown
/// collection, no environment) yields `success: false` with the error
/// message; per-request failures stay inside the outcome. Both arms
/// carry a top-level `success` field, so the host branches the same way
/// as for every other operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RunResponse {
    /// The run completed; individual results may still have failed.
    Completed(RunOutcome),

    /// The run aborted before executing any request.
    Aborted {
        /// Always false.
        success: bool,

        /// Failure description.
        error: String,
    },
}

impl From<Result<RunOutcome, RunnerError>> for RunResponse {
    fn from(result: Result<RunOutcome, RunnerError>) -> Self {
        match result {
            Ok(outcome) => Self::Completed(outcome),
            Err(e) => Self::Aborted {
                success: false,
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn op_response_skips_absent_fields() {
        let ok = serde_json::to_value(OpResponse::ok_id(7)).expect("serialize");
        assert_eq!(ok, json!({"success": true, "id": 7}));

        let err = serde_json::to_value(OpResponse::err("boom")).expect("serialize");
        assert_eq!(err, json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn run_response_flattens_outcome() {
        let response = RunResponse::from(Err(RunnerError::CollectionNotFound));
        let json = serde_json::to_value(response).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Collection not found");
        assert!(json.get("results").is_none());
    }
}
