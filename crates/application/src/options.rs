//! Per-call option bags for the client facades.

use pokefetch_domain::{CacheHints, Headers, Revalidate};

use crate::cancellation::CancellationSignal;

/// Caller-supplied options for one REST call. Every field is optional;
/// unset fields fall back to the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers; these win over the client's defaults.
    pub headers: Headers,
    /// Overrides the client's base URL.
    pub base_url: Option<String>,
    /// Overrides the client's default timeout.
    pub timeout_ms: Option<u64>,
    /// Cache tags added to the client's defaults.
    pub tags: Vec<String>,
    /// Overrides the revalidate window.
    pub revalidate: Option<Revalidate>,
    /// External cancellation signal.
    pub signal: Option<CancellationSignal>,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Adds a cache tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the revalidate window.
    #[must_use]
    pub const fn revalidate(mut self, revalidate: Revalidate) -> Self {
        self.revalidate = Some(revalidate);
        self
    }

    /// Attaches an external cancellation signal.
    #[must_use]
    pub fn signal(mut self, signal: CancellationSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// The caller's cache hints.
    #[must_use]
    pub fn cache_hints(&self) -> CacheHints {
        CacheHints {
            tags: self.tags.clone(),
            revalidate: self.revalidate,
        }
    }
}

/// Options for one GraphQL operation.
#[derive(Debug, Clone, Default)]
pub struct GraphqlOptions {
    /// Operation to run when the document defines several.
    pub operation_name: Option<String>,
    /// Transport options shared with REST calls.
    pub request: RequestOptions,
}

impl GraphqlOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation name.
    #[must_use]
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request = self.request.timeout_ms(timeout_ms);
        self
    }

    /// Adds a cache tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.request = self.request.tag(tag);
        self
    }

    /// Sets the revalidate window.
    #[must_use]
    pub fn revalidate(mut self, revalidate: Revalidate) -> Self {
        self.request = self.request.revalidate(revalidate);
        self
    }

    /// Attaches an external cancellation signal.
    #[must_use]
    pub fn signal(mut self, signal: CancellationSignal) -> Self {
        self.request = self.request.signal(signal);
        self
    }
}
