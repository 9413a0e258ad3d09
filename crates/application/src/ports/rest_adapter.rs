//! REST transport port

use async_trait::async_trait;
use serde_json::Value;

use super::RequestContext;
use crate::error::ClientResult;

/// Performs one REST call.
///
/// Implementations honour `context.effective_signal()`, translate non-2xx
/// responses into [`ClientError::Http`](crate::ClientError::Http) and return
/// the decoded JSON payload (an empty object when a successful body is not
/// JSON).
#[async_trait]
pub trait RestAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Executes the request and returns the decoded payload.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, cancellation or a
    /// non-success status.
    async fn request(&self, context: RequestContext) -> ClientResult<Value>;
}
