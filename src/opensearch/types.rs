//! Shared types used by the OpenSearch client and helpers.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned while interacting with OpenSearch.
#[derive(Debug, Error)]
pub enum OpenSearchError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid OpenSearch URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Request or response body could not be (de)serialized.
    #[error("Failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
    /// OpenSearch responded with an unexpected status code.
    #[error("Unexpected OpenSearch response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from OpenSearch.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The bulk request was accepted but some documents were rejected.
    #[error("{failed} of {total} bulk items failed; first error: {reason}")]
    BulkRejected {
        /// Number of rejected items.
        failed: usize,
        /// Number of items in the request.
        total: usize,
        /// Reason reported for the first rejected item.
        reason: String,
    },
}

/// Summary describing how OpenSearch applied a bulk request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Documents that did not exist before the request.
    pub created: usize,
    /// Documents overwritten in place (same `_id`).
    pub updated: usize,
}

impl IndexSummary {
    /// Total documents written.
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    #[serde(default)]
    pub(crate) errors: bool,
    #[serde(default)]
    pub(crate) items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkItem {
    #[serde(rename = "_id", default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) status: u16,
    #[serde(default)]
    pub(crate) result: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<Value>,
}

impl BulkItem {
    pub(crate) fn is_failure(&self) -> bool {
        self.error.is_some() || self.status >= 300
    }

    pub(crate) fn failure_reason(&self) -> String {
        let id = self.id.as_deref().unwrap_or("<unknown>");
        let reason = match &self.error {
            Some(Value::Object(map)) => map
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            Some(other) => other.to_string(),
            None => format!("status {}", self.status),
        };
        format!("{id}: {reason}")
    }
}

impl BulkResponse {
    /// Fold the per-item results into a summary, or the first rejection.
    pub(crate) fn into_summary(self) -> Result<IndexSummary, OpenSearchError> {
        let total = self.items.len();
        let mut summary = IndexSummary::default();
        let mut failed = 0;
        let mut first_reason: Option<String> = None;

        for item in self.items.into_iter().flat_map(HashMap::into_values) {
            if item.is_failure() {
                failed += 1;
                if first_reason.is_none() {
                    first_reason = Some(item.failure_reason());
                }
                continue;
            }
            match item.result.as_deref() {
                Some("updated") => summary.updated += 1,
                _ => summary.created += 1,
            }
        }

        if failed > 0 || self.errors {
            return Err(OpenSearchError::BulkRejected {
                failed,
                total,
                reason: first_reason.unwrap_or_else(|| "bulk response flagged errors".into()),
            });
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_counts_created_and_updated() {
        let response: BulkResponse = serde_json::from_value(json!({
            "took": 3,
            "errors": false,
            "items": [
                { "index": { "_id": "1", "status": 201, "result": "created" } },
                { "index": { "_id": "2", "status": 200, "result": "updated" } },
                { "index": { "_id": "3", "status": 201, "result": "created" } }
            ]
        }))
        .expect("bulk response");

        let summary = response.into_summary().expect("summary");
        assert_eq!(summary, IndexSummary { created: 2, updated: 1 });
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn rejected_items_surface_first_reason() {
        let response: BulkResponse = serde_json::from_value(json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201, "result": "created" } },
                { "index": { "_id": "2", "status": 400, "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse field [title]"
                } } },
                { "index": { "_id": "3", "status": 429, "error": { "type": "es_rejected_execution_exception" } } }
            ]
        }))
        .expect("bulk response");

        match response.into_summary() {
            Err(OpenSearchError::BulkRejected {
                failed,
                total,
                reason,
            }) => {
                assert_eq!(failed, 2);
                assert_eq!(total, 3);
                assert_eq!(reason, "2: failed to parse field [title]");
            }
            other => panic!("expected bulk rejection, got {other:?}"),
        }
    }
}
