//! API Gateway proxy responses

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::error;

use crate::error::OrchestratorError;

/// Lambda proxy integration response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub is_base64_encoded: bool,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            is_base64_encoded: false,
            body: body.into(),
            headers: BTreeMap::from([("Content-Type".to_string(), "plain/text".to_string())]),
        }
    }

    /// 200 with a plain text body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// 200 with a compact JSON body
    pub fn ok_json(body: &Value) -> Self {
        Self::new(200, body.to_string())
    }

    /// Map an error to its response, logging it
    ///
    /// The underlying error text is only exposed when `detailed` is set.
    pub fn from_error(err: &OrchestratorError, detailed: bool) -> Self {
        let message = match err {
            OrchestratorError::BadRequest(_) => "A BadRequest exception occurred",
            OrchestratorError::Service { .. } => "An AWS service error occurred",
            _ => "An Unexpected Server side exception occurred",
        };
        error!(status = err.status_code(), "{}: {}", message, err);

        let body = if detailed {
            json!({"message": message, "detailedMessage": err.to_string()})
        } else {
            json!({"message": message})
        };
        Self::new(err.status_code(), body.to_string())
    }

    /// Decoded JSON body
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}
