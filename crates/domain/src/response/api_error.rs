//! Structured error for non-success HTTP responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::StatusCode;

/// Error produced when an upstream answers with a non-2xx status.
///
/// `message` prefers the server's own `message` field and falls back to the
/// status text; `details` keeps the parsed error body, if there was one.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (HTTP {status})")]
pub struct ApiError {
    /// Human-readable message.
    pub message: String,
    /// HTTP status code.
    pub status: u16,
    /// Parsed error body returned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    /// Creates an error with a message and no details.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            details: None,
        }
    }

    /// Builds the error for a failed response.
    ///
    /// `status_text` is the transport's reason phrase; when it is missing or
    /// empty the canonical phrase for `status` is used instead.
    #[must_use]
    pub fn from_response(status: u16, status_text: Option<&str>, body: Option<Value>) -> Self {
        let server_message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let message = server_message.unwrap_or_else(|| {
            status_text
                .filter(|text| !text.is_empty())
                .map_or_else(
                    || StatusCode(status).reason_phrase().to_string(),
                    str::to_string,
                )
        });

        Self {
            message,
            status,
            details: body,
        }
    }

    /// Returns true for a 404 response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }
}
