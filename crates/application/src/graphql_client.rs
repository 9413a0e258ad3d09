//! GraphQL client facade
//!
//! Every operation goes to one endpoint as a POST; the adapter encodes the
//! `{ query, variables, operationName }` body and returns the
//! `{ data, errors }` envelope.

use std::fmt;
use std::sync::Arc;

use pokefetch_domain::{
    CacheHints, GraphqlRequest, GraphqlResponse, Headers, HttpMethod, OperationKind, RequestConfig,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::endpoint::graphql_endpoint;
use crate::error::{ClientError, ClientResult};
use crate::options::GraphqlOptions;
use crate::ports::{GraphqlAdapter, RequestContext};

/// Client for a single GraphQL endpoint over a pluggable adapter.
#[derive(Clone)]
pub struct GraphqlClient {
    endpoint: String,
    adapter: Arc<dyn GraphqlAdapter>,
    default_headers: Headers,
    default_timeout_ms: Option<u64>,
    default_cache: CacheHints,
}

impl fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint)
            .field("adapter", &self.adapter.name())
            .finish_non_exhaustive()
    }
}

impl GraphqlClient {
    /// Creates a client for the GraphQL endpoint under `base_url`.
    #[must_use]
    pub fn new(base_url: &str, adapter: Arc<dyn GraphqlAdapter>) -> Self {
        Self {
            endpoint: graphql_endpoint(base_url),
            adapter,
            default_headers: Headers::new(),
            default_timeout_ms: None,
            default_cache: CacheHints::default(),
        }
    }

    /// Adds a header sent with every operation.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }

    /// Sends `Authorization: Bearer <token>` with every operation.
    #[must_use]
    pub fn with_bearer_token(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }

    /// Sets the timeout used when the caller supplies none.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Sets cache hints applied to queries.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheHints) -> Self {
        self.default_cache = cache;
        self
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the request body and configuration for one operation.
    #[must_use]
    pub fn build(
        &self,
        kind: OperationKind,
        document: &str,
        variables: Option<Value>,
        options: &GraphqlOptions,
    ) -> (GraphqlRequest, RequestConfig) {
        let request = GraphqlRequest {
            query: document.to_string(),
            variables,
            operation_name: options.operation_name.clone(),
        };

        let endpoint = options
            .request
            .base_url
            .as_deref()
            .map_or_else(|| self.endpoint.clone(), graphql_endpoint);

        let mut headers = self.default_headers.clone();
        headers.set("Content-Type", "application/json");
        headers.set_if_absent("Accept", "application/json");
        headers.extend_from(&options.request.headers);

        let caller_cache = options.request.cache_hints();
        let cache = if kind.is_cacheable() {
            self.default_cache.merge(&caller_cache)
        } else {
            caller_cache
        };

        let config = RequestConfig::new(HttpMethod::Post, endpoint)
            .with_headers(headers)
            .with_timeout_ms(options.request.timeout_ms.or(self.default_timeout_ms))
            .with_cache(cache);

        (request, config)
    }

    /// Runs an operation of the given kind.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error, or [`ClientError::Deserialization`] when
    /// `data` does not match `T`.
    #[instrument(skip(self, document, variables, options), fields(adapter = self.adapter.name()))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        kind: OperationKind,
        document: &str,
        variables: Option<Value>,
        options: GraphqlOptions,
    ) -> ClientResult<GraphqlResponse<T>> {
        let (request, config) = self.build(kind, document, variables, &options);
        debug!(
            endpoint = %config.url,
            operation = ?request.operation_name,
            tags = ?config.cache.tags,
            "dispatching GraphQL operation"
        );

        let context = RequestContext::new(config).with_signal(options.request.signal);
        let response = self.adapter.execute(kind, &request, context).await?;
        if let Some(message) = response.error_message() {
            warn!(%message, "GraphQL response carried errors");
        }

        response
            .decode()
            .map_err(|e| ClientError::Deserialization(e.to_string()))
    }

    /// Runs a query.
    ///
    /// # Errors
    ///
    /// See [`GraphqlClient::execute`].
    pub async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Value>,
        options: GraphqlOptions,
    ) -> ClientResult<GraphqlResponse<T>> {
        self.execute(OperationKind::Query, document, variables, options)
            .await
    }

    /// Runs a mutation.
    ///
    /// # Errors
    ///
    /// See [`GraphqlClient::execute`].
    pub async fn mutation<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Value>,
        options: GraphqlOptions,
    ) -> ClientResult<GraphqlResponse<T>> {
        self.execute(OperationKind::Mutation, document, variables, options)
            .await
    }

    /// Runs a subscription as a single request/response exchange.
    ///
    /// # Errors
    ///
    /// See [`GraphqlClient::execute`].
    pub async fn subscription<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Value>,
        options: GraphqlOptions,
    ) -> ClientResult<GraphqlResponse<T>> {
        self.execute(OperationKind::Subscription, document, variables, options)
            .await
    }

    /// Runs a query and returns its `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Graphql`] when the response has errors and no
    /// data, plus everything [`GraphqlClient::execute`] can return.
    pub async fn query_data<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Option<Value>,
        options: GraphqlOptions,
    ) -> ClientResult<Option<T>> {
        let response = self.query(document, variables, options).await?;
        match (response.data, response.errors) {
            (Some(data), _) => Ok(Some(data)),
            (None, Some(errors)) if !errors.is_empty() => Err(ClientError::Graphql(
                errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
            (None, _) => Ok(None),
        }
    }
}
