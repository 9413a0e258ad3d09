//! Client error types

use pokefetch_domain::{ActionResult, ApiError};
use thiserror::Error;

use crate::cancellation::CancelReason;

/// Errors returned by the client facades and adapters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The upstream answered with a non-2xx status.
    #[error(transparent)]
    Http(#[from] ApiError),

    /// The transport failed (DNS, connection, TLS, broken body stream).
    #[error("network error: {0}")]
    Network(String),

    /// The request's timeout elapsed.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// The caller's cancellation signal fired.
    #[error("request cancelled")]
    Cancelled,

    /// The target URL could not be resolved.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Serialization(String),

    /// The payload did not match the expected type.
    #[error("failed to decode response: {0}")]
    Deserialization(String),

    /// A GraphQL response carried errors and no data.
    #[error("GraphQL error: {0}")]
    Graphql(String),
}

impl ClientError {
    /// Returns the HTTP status for HTTP-level failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http(error) => Some(error.status),
            _ => None,
        }
    }

    /// Returns true for a 404 response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Http(error) if error.is_not_found())
    }
}

impl From<CancelReason> for ClientError {
    fn from(reason: CancelReason) -> Self {
        match reason {
            CancelReason::Aborted => Self::Cancelled,
            CancelReason::TimedOut { timeout_ms } => Self::Timeout { timeout_ms },
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Extension trait converting fetch results into the view-facing shape.
pub trait FetchResultExt<T> {
    /// Converts into an [`ActionResult`], mapping 404 to the not-found state.
    fn into_action_result(self) -> ActionResult<T>;
}

impl<T> FetchResultExt<T> for ClientResult<T> {
    fn into_action_result(self) -> ActionResult<T> {
        match self {
            Ok(data) => ActionResult::ok(data),
            Err(e) if e.is_not_found() => ActionResult::missing(e.to_string()),
            Err(e) => ActionResult::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cancel_reason_conversion() {
        assert_eq!(ClientError::from(CancelReason::Aborted), ClientError::Cancelled);
        assert_eq!(
            ClientError::from(CancelReason::TimedOut { timeout_ms: 250 }),
            ClientError::Timeout { timeout_ms: 250 }
        );
    }

    #[test]
    fn test_http_error_exposes_status() {
        let error = ClientError::from(ApiError::new(404, "Not Found"));
        assert_eq!(error.status(), Some(404));
        assert!(error.is_not_found());
        assert_eq!(ClientError::Cancelled.status(), None);
    }

    #[test]
    fn test_into_action_result() {
        let missing: ClientResult<u8> = Err(ApiError::new(404, "Not Found").into());
        let action = missing.into_action_result();
        assert!(action.is_not_found());
        assert_eq!(action.error.as_deref(), Some("Not Found (HTTP 404)"));

        let failed: ClientResult<u8> = Err(ClientError::Network("connection reset".into()));
        let action = failed.into_action_result();
        assert!(!action.success);
        assert!(!action.is_not_found());

        let ok: ClientResult<u8> = Ok(7);
        assert_eq!(ok.into_action_result().data, Some(7));
    }
}
