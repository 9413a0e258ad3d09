//! GraphQL transport port

use async_trait::async_trait;
use pokefetch_domain::{GraphqlRequest, GraphqlResponse, OperationKind};
use serde_json::Value;

use super::RequestContext;
use crate::error::ClientResult;

/// Sends one GraphQL operation to a single endpoint.
///
/// `context.config` carries the endpoint URL, headers, timeout and cache
/// hints; the adapter encodes `request` as the JSON body.
#[async_trait]
pub trait GraphqlAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Executes the operation and returns the `{ data, errors }` envelope.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, cancellation or a
    /// non-success status. GraphQL-level errors are returned inside the
    /// envelope, not as `Err`.
    async fn execute(
        &self,
        kind: OperationKind,
        request: &GraphqlRequest,
        context: RequestContext,
    ) -> ClientResult<GraphqlResponse<Value>>;
}
