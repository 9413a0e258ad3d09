//! Per-call request configuration handed to adapters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CacheHints, Headers, HttpMethod};

/// Everything an adapter needs to perform one call.
///
/// Built by the client facades from their defaults and the caller's options,
/// then dropped once the call completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully resolved target URL.
    pub url: String,
    /// JSON body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
    /// Timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Cache hints passed through to the data cache.
    #[serde(default)]
    pub cache: CacheHints,
}

impl RequestConfig {
    /// Creates a configuration with no body, headers, timeout or hints.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Headers::new(),
            timeout_ms: None,
            cache: CacheHints::default(),
        }
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the cache hints.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheHints) -> Self {
        self.cache = cache;
        self
    }
}
