//! REST client facade
//!
//! Resolves the target URL, merges the caller's options with the client's
//! defaults into a [`RequestConfig`] and hands it to the injected
//! [`RestAdapter`]. The facade itself never retries and never touches the
//! network.

use std::fmt;
use std::sync::Arc;

use pokefetch_domain::{CacheHints, Headers, HttpMethod, RequestConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::endpoint::join_url;
use crate::error::{ClientError, ClientResult};
use crate::options::RequestOptions;
use crate::ports::{RequestContext, RestAdapter};

/// Verb-shortcut client over a pluggable REST adapter.
///
/// Cheap to clone; clones share the adapter.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    adapter: Arc<dyn RestAdapter>,
    default_headers: Headers,
    default_timeout_ms: Option<u64>,
    default_cache: CacheHints,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("adapter", &self.adapter.name())
            .field("default_timeout_ms", &self.default_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Creates a client for `base_url` backed by `adapter`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, adapter: Arc<dyn RestAdapter>) -> Self {
        Self {
            base_url: base_url.into(),
            adapter,
            default_headers: Headers::new(),
            default_timeout_ms: None,
            default_cache: CacheHints::default(),
        }
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
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

    /// Sets cache hints applied to cacheable (GET/HEAD) requests.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheHints) -> Self {
        self.default_cache = cache;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the configuration that would be sent for this call.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL cannot be resolved.
    pub fn build_config(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> ClientResult<RequestConfig> {
        let base = options.base_url.as_deref().unwrap_or(&self.base_url);
        let url = join_url(base, path)?;

        let mut headers = self.default_headers.clone();
        headers.set_if_absent("Accept", "application/json");
        if body.is_some() {
            headers.set("Content-Type", "application/json");
        }
        headers.extend_from(&options.headers);

        let cache = if method.is_cacheable() {
            self.default_cache.merge(&options.cache_hints())
        } else {
            options.cache_hints()
        };

        let config = RequestConfig::new(method, url)
            .with_headers(headers)
            .with_timeout_ms(options.timeout_ms.or(self.default_timeout_ms))
            .with_cache(cache);
        Ok(match body {
            Some(body) => config.with_body(body),
            None => config,
        })
    }

    /// Sends a request and decodes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error, or [`ClientError::Deserialization`] when
    /// the payload does not match `T`.
    #[instrument(skip(self, body, options), fields(adapter = self.adapter.name()))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let config = self.build_config(method, path, body, &options)?;
        debug!(url = %config.url, tags = ?config.cache.tags, "dispatching request");

        let context = RequestContext::new(config).with_signal(options.signal);
        let payload = self.adapter.request(context).await?;

        serde_json::from_value(payload).map_err(|e| ClientError::Deserialization(e.to_string()))
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ClientResult<T> {
        self.request(HttpMethod::Get, path, None, options).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        self.request(HttpMethod::Delete, path, None, options).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if `body` cannot be encoded,
    /// otherwise see [`RestClient::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B, options: RequestOptions) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Post, path, Some(encode(body)?), options)
            .await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::post`].
    pub async fn put<T, B>(&self, path: &str, body: &B, options: RequestOptions) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Put, path, Some(encode(body)?), options)
            .await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::post`].
    pub async fn patch<T, B>(&self, path: &str, body: &B, options: RequestOptions) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Patch, path, Some(encode(body)?), options)
            .await
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ClientResult<Value> {
    serde_json::to_value(body).map_err(|e| ClientError::Serialization(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pokefetch_domain::{ApiError, Revalidate};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    use crate::cancellation::CancellationSignal;

    /// Records every context and answers with a canned result.
    struct RecordingAdapter {
        response: ClientResult<Value>,
        seen: Mutex<Vec<RequestContext>>,
    }

    impl RecordingAdapter {
        fn ok(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(payload),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn err(error: ClientError) -> Arc<Self> {
            Arc::new(Self {
                response: Err(error),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> RequestContext {
            self.seen.lock().unwrap().last().cloned().expect("no request recorded")
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RestAdapter for RecordingAdapter {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn request(&self, context: RequestContext) -> ClientResult<Value> {
            self.seen.lock().unwrap().push(context);
            self.response.clone()
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pokemon {
        id: u32,
        name: String,
    }

    #[tokio::test]
    async fn test_get_returns_decoded_payload_without_tags_or_retry() {
        let adapter = RecordingAdapter::ok(json!({ "id": 25, "name": "pikachu" }));
        let client = RestClient::new("https://pokeapi.co/api/v2", adapter.clone());

        let pokemon: Pokemon = client
            .get("/pokemon/pikachu", RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(
            pokemon,
            Pokemon {
                id: 25,
                name: "pikachu".to_string()
            }
        );
        assert_eq!(adapter.calls(), 1);

        let context = adapter.last();
        assert_eq!(context.config.method, HttpMethod::Get);
        assert_eq!(context.config.url, "https://pokeapi.co/api/v2/pokemon/pikachu");
        assert_eq!(context.config.timeout_ms, None);
        assert!(context.config.cache.is_empty());
        assert!(context.config.body.is_none());
        assert!(context.signal.is_none());
    }

    #[tokio::test]
    async fn test_raw_value_payload_passes_through_unchanged() {
        let payload = json!({ "name": "bulbasaur", "types": [{ "slot": 1 }] });
        let adapter = RecordingAdapter::ok(payload.clone());
        let client = RestClient::new("https://pokeapi.co/api/v2", adapter);

        let value: Value = client.get("pokemon/bulbasaur", RequestOptions::new()).await.unwrap();

        assert_eq!(value, payload);
    }

    #[tokio::test]
    async fn test_post_encodes_body_and_sets_content_type() {
        let adapter = RecordingAdapter::ok(json!({ "ok": true }));
        let client = RestClient::new("https://cms.example.com/api", adapter.clone());

        let _: Value = client
            .post("/entries", &json!({ "title": "Hello" }), RequestOptions::new())
            .await
            .unwrap();

        let config = adapter.last().config;
        assert_eq!(config.method, HttpMethod::Post);
        assert_eq!(config.body, Some(json!({ "title": "Hello" })));
        assert_eq!(config.headers.get("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_verb_shortcuts_use_their_methods() {
        let adapter = RecordingAdapter::ok(json!({}));
        let client = RestClient::new("https://api.example.com", adapter.clone());

        let _: Value = client.put("/a", &json!({}), RequestOptions::new()).await.unwrap();
        assert_eq!(adapter.last().config.method, HttpMethod::Put);

        let _: Value = client.patch("/a", &json!({}), RequestOptions::new()).await.unwrap();
        assert_eq!(adapter.last().config.method, HttpMethod::Patch);

        let _: Value = client.delete("/a", RequestOptions::new()).await.unwrap();
        assert_eq!(adapter.last().config.method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn test_options_override_defaults() {
        let adapter = RecordingAdapter::ok(json!({}));
        let client = RestClient::new("https://pokeapi.co/api/v2", adapter.clone())
            .with_bearer_token("default-token")
            .with_timeout_ms(Some(5_000))
            .with_cache(CacheHints::tagged(["pokemon"]).with_revalidate(Revalidate::Seconds(3600)));

        let signal = CancellationSignal::new();
        let options = RequestOptions::new()
            .base_url("https://staging.pokeapi.co/api/v2/")
            .header("authorization", "Bearer override")
            .timeout_ms(250)
            .tag("pikachu")
            .signal(signal.clone());

        let _: Value = client.get("pokemon/pikachu", options).await.unwrap();

        let context = adapter.last();
        assert_eq!(context.config.url, "https://staging.pokeapi.co/api/v2/pokemon/pikachu");
        assert_eq!(context.config.headers.get("Authorization"), Some("Bearer override"));
        assert_eq!(context.config.timeout_ms, Some(250));
        assert_eq!(
            context.config.cache.tags,
            vec!["pokemon".to_string(), "pikachu".to_string()]
        );
        assert_eq!(context.config.cache.revalidate, Some(Revalidate::Seconds(3600)));
        assert!(context.signal.unwrap().same_as(&signal));
    }

    #[tokio::test]
    async fn test_default_cache_hints_skip_mutations() {
        let adapter = RecordingAdapter::ok(json!({}));
        let client = RestClient::new("https://api.example.com", adapter.clone())
            .with_cache(CacheHints::tagged(["entries"]));

        let _: Value = client.post("/entries", &json!({}), RequestOptions::new()).await.unwrap();

        assert!(adapter.last().config.cache.is_empty());
    }

    #[tokio::test]
    async fn test_default_timeout_applies_when_caller_has_none() {
        let adapter = RecordingAdapter::ok(json!({}));
        let client = RestClient::new("https://api.example.com", adapter.clone())
            .with_timeout_ms(Some(1_500));

        let _: Value = client.get("/", RequestOptions::new()).await.unwrap();

        assert_eq!(adapter.last().config.timeout_ms, Some(1_500));
    }

    #[tokio::test]
    async fn test_adapter_errors_propagate() {
        let adapter = RecordingAdapter::err(ApiError::new(404, "Not Found").into());
        let client = RestClient::new("https://pokeapi.co/api/v2", adapter);

        let result: ClientResult<Value> = client.get("/pokemon/missingno", RequestOptions::new()).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_payload_type_mismatch_is_deserialization_error() {
        let adapter = RecordingAdapter::ok(json!({}));
        let client = RestClient::new("https://pokeapi.co/api/v2", adapter);

        let result: ClientResult<Pokemon> = client.get("/pokemon/ditto", RequestOptions::new()).await;

        assert!(matches!(result, Err(ClientError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_invalid_base_url_never_reaches_adapter() {
        let adapter = RecordingAdapter::ok(json!({}));
        let client = RestClient::new("not a url", adapter.clone());

        let result: ClientResult<Value> = client.get("/x", RequestOptions::new()).await;

        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
        assert_eq!(adapter.calls(), 0);
    }
}
