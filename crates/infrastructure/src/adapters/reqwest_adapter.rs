//! HTTP transport implementation using reqwest.
//!
//! [`ReqwestAdapter`] implements both the REST and the GraphQL port. Each
//! call is raced against the request's effective cancellation signal and
//! its response is passed through the shared translation in
//! [`crate::http`].

use async_trait::async_trait;
use pokefetch_application::{
    ClientError, ClientResult, GraphqlAdapter, RequestContext, RestAdapter, with_cancellation,
};
use pokefetch_domain::{GraphqlRequest, GraphqlResponse, HttpMethod, OperationKind, RequestConfig};
use hyper::ext::ReasonPhrase;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::http::{translate_graphql_response, translate_response};

const USER_AGENT: &str = concat!("pokefetch/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// Status, reason phrase and body of a completed exchange.
#[derive(Debug)]
struct RawResponse {
    status: u16,
    status_text: Option<String>,
    body: Vec<u8>,
}

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestAdapter {
    client: Client,
}

impl ReqwestAdapter {
    /// Creates an adapter with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "pokefetch/<version>"
    ///
    /// Request timeouts are not set on the client; they come from each
    /// request's cancellation signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates an adapter around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn map_error(error: &reqwest::Error, timeout_ms: Option<u64>) -> ClientError {
        if error.is_timeout() {
            return ClientError::Timeout {
                timeout_ms: timeout_ms.unwrap_or_default(),
            };
        }

        let host = error
            .url()
            .and_then(Url::host_str)
            .unwrap_or("unknown")
            .to_string();

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return ClientError::Network(format!("could not resolve {host}: {message}"));
            }
            if lower.contains("refused") {
                return ClientError::Network(format!("connection refused by {host}"));
            }
            return ClientError::Network(format!("connection to {host} failed: {message}"));
        }

        if error.is_redirect() {
            return ClientError::Network(format!("more than {MAX_REDIRECTS} redirects from {host}"));
        }

        if error.is_builder() {
            return ClientError::InvalidUrl(error.to_string());
        }

        ClientError::Network(error.to_string())
    }

    /// The reason phrase the server sent, else the canonical one for the
    /// status. hyper only keeps a phrase that differs from the canonical one.
    fn status_text(response: &reqwest::Response) -> Option<String> {
        response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
            .filter(|phrase| !phrase.is_empty())
            .or_else(|| response.status().canonical_reason().map(str::to_string))
    }

    /// Sends `config` with `body` and reads the whole response.
    async fn send(
        &self,
        config: &RequestConfig,
        body: Option<Vec<u8>>,
        context: &RequestContext,
    ) -> ClientResult<RawResponse> {
        let url = Url::parse(&config.url)
            .map_err(|e| ClientError::InvalidUrl(format!("{e}: {}", config.url)))?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(config.method), url);
        for header in config.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let request_id = Uuid::now_v7();
        let span = info_span!(
            "http_request",
            %request_id,
            method = %config.method,
            url = %config.url,
        );
        if !config.cache.is_empty() {
            debug!(parent: &span, tags = ?config.cache.tags, revalidate = ?config.cache.revalidate, "cache hints");
        }

        let timeout_ms = config.timeout_ms;
        let signal = context.effective_signal();
        let exchange = async move {
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status();
            let status_text = Self::status_text(&response);
            let body = response
                .bytes()
                .await
                .map_err(|e| ClientError::Network(format!("failed to read body: {e}")))?
                .to_vec();

            debug!(status = status.as_u16(), bytes = body.len(), "response received");
            Ok(RawResponse {
                status: status.as_u16(),
                status_text,
                body,
            })
        };

        with_cancellation(signal.as_ref(), exchange.instrument(span)).await
    }
}

#[async_trait]
impl RestAdapter for ReqwestAdapter {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn request(&self, context: RequestContext) -> ClientResult<Value> {
        let body = context
            .config
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ClientError::Serialization(e.to_string()))?;

        let raw = self.send(&context.config, body, &context).await?;
        translate_response(raw.status, raw.status_text.as_deref(), &raw.body)
    }
}

#[async_trait]
impl GraphqlAdapter for ReqwestAdapter {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn execute(
        &self,
        kind: OperationKind,
        request: &GraphqlRequest,
        context: RequestContext,
    ) -> ClientResult<GraphqlResponse<Value>> {
        let body =
            serde_json::to_vec(request).map_err(|e| ClientError::Serialization(e.to_string()))?;
        debug!(operation = kind.as_str(), name = ?request.operation_name, "sending GraphQL operation");

        let raw = self.send(&context.config, Some(body), &context).await?;
        translate_graphql_response(raw.status, raw.status_text.as_deref(), &raw.body)
    }
}
