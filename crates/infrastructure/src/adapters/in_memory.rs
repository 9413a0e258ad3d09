//! Fixture-backed transport for offline use and tests.
//!
//! [`InMemoryAdapter`] answers from a table of canned responses instead of
//! the network. Responses go through the same translation as the reqwest
//! adapter, so callers see identical success and error shapes. An optional
//! latency makes timeouts and cancellation observable.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pokefetch_application::{
    ClientError, ClientResult, GraphqlAdapter, RequestContext, RestAdapter, with_cancellation,
};
use pokefetch_domain::{GraphqlRequest, GraphqlResponse, HttpMethod, OperationKind, RequestConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::http::{translate_graphql_response, translate_response};
use crate::serialization::{SerializationError, from_json_bytes};

fn default_status() -> u16 {
    200
}

/// A canned response for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Method to match.
    #[serde(default)]
    pub method: HttpMethod,
    /// Absolute URL to match, compared verbatim.
    pub url: String,
    /// GraphQL operation name to match. Matches any operation when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Status to answer with.
    #[serde(default = "default_status")]
    pub status: u16,
    /// Status text to answer with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// JSON body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Raw body, sent instead of `body` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
}

impl Fixture {
    /// A fixture answering `method url` with `status` and a JSON body.
    #[must_use]
    pub fn json(method: HttpMethod, url: impl Into<String>, status: u16, body: Value) -> Self {
        Self {
            method,
            url: url.into(),
            operation_name: None,
            status,
            status_text: None,
            body: Some(body),
            raw_body: None,
        }
    }

    /// A fixture answering `method url` with `status` and a raw text body.
    #[must_use]
    pub fn raw(method: HttpMethod, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            raw_body: Some(body.into()),
            body: None,
            ..Self::json(method, url, status, Value::Null)
        }
    }

    /// Restricts the fixture to one GraphQL operation name.
    #[must_use]
    pub fn for_operation(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Overrides the status text.
    #[must_use]
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    fn matches(&self, config: &RequestConfig, operation_name: Option<&str>) -> bool {
        self.method == config.method
            && self.url == config.url
            && self
                .operation_name
                .as_deref()
                .is_none_or(|name| Some(name) == operation_name)
    }

    fn body_bytes(&self) -> Vec<u8> {
        if let Some(raw) = &self.raw_body {
            return raw.as_bytes().to_vec();
        }
        self.body
            .as_ref()
            .map(|body| body.to_string().into_bytes())
            .unwrap_or_default()
    }
}

/// Fixture file layout: `{ "fixtures": [ ... ] }`.
#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    fixtures: Vec<Fixture>,
}

/// A request as seen by the in-memory adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// The configuration handed to the adapter.
    pub config: RequestConfig,
    /// The body that would have been sent.
    pub body: Option<Value>,
}

/// Transport answering from fixtures.
///
/// Unmatched requests get a 404 with a JSON `message`.
#[derive(Debug, Default)]
pub struct InMemoryAdapter {
    fixtures: Vec<Fixture>,
    latency: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl InMemoryAdapter {
    /// Creates an adapter with no fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter from a list of fixtures.
    #[must_use]
    pub fn with_fixtures(fixtures: Vec<Fixture>) -> Self {
        Self {
            fixtures,
            ..Self::default()
        }
    }

    /// Loads fixtures from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, FixtureError> {
        let bytes = tokio::fs::read(path).await?;
        let file: FixtureFile = from_json_bytes(&bytes)?;
        debug!(path = %path.display(), fixtures = file.fixtures.len(), "fixtures loaded");
        Ok(Self::with_fixtures(file.fixtures))
    }

    /// Adds a fixture. Earlier fixtures win when several match.
    #[must_use]
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn record(&self, config: &RequestConfig, body: Option<Value>) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                config: config.clone(),
                body,
            });
        }
    }

    fn lookup(&self, config: &RequestConfig, operation_name: Option<&str>) -> (u16, Option<String>, Vec<u8>) {
        self.fixtures
            .iter()
            .find(|fixture| fixture.matches(config, operation_name))
            .map_or_else(
                || {
                    debug!(method = %config.method, url = %config.url, "no fixture matched");
                    let body = json!({
                        "message": format!("no fixture for {} {}", config.method, config.url)
                    });
                    (404, None, body.to_string().into_bytes())
                },
                |fixture| (fixture.status, fixture.status_text.clone(), fixture.body_bytes()),
            )
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Errors raised while loading a fixture file.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The file could not be read.
    #[error("failed to read fixtures: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid fixture document.
    #[error("invalid fixtures: {0}")]
    Parse(#[from] SerializationError),
}

#[async_trait]
impl RestAdapter for InMemoryAdapter {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn request(&self, context: RequestContext) -> ClientResult<Value> {
        let config = &context.config;
        self.record(config, config.body.clone());

        let signal = context.effective_signal();
        with_cancellation(signal.as_ref(), async {
            self.delay().await;
            let (status, status_text, body) = self.lookup(config, None);
            translate_response(status, status_text.as_deref(), &body)
        })
        .await
    }
}

#[async_trait]
impl GraphqlAdapter for InMemoryAdapter {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn execute(
        &self,
        kind: OperationKind,
        request: &GraphqlRequest,
        context: RequestContext,
    ) -> ClientResult<GraphqlResponse<Value>> {
        let config = &context.config;
        let body =
            serde_json::to_value(request).map_err(|e| ClientError::Serialization(e.to_string()))?;
        self.record(config, Some(body));
        debug!(operation = kind.as_str(), "answering GraphQL operation from fixtures");

        let signal = context.effective_signal();
        with_cancellation(signal.as_ref(), async {
            self.delay().await;
            let (status, status_text, body) = self.lookup(config, request.operation_name.as_deref());
            translate_graphql_response(status, status_text.as_deref(), &body)
        })
        .await
    }
}
