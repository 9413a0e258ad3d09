//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client facades and the
//! transports or storage backends behind them. Each port is a trait
//! implemented by adapters in the infrastructure layer; instances are shared
//! as `Arc<dyn …>` and hold no per-call state.

mod graphql_adapter;
mod rest_adapter;
mod storage;

pub use graphql_adapter::GraphqlAdapter;
pub use rest_adapter::RestAdapter;
pub use storage::{KeyValueStorage, StorageError};

use pokefetch_domain::RequestConfig;

use crate::cancellation::CancellationSignal;

/// A request configuration plus the caller's cancellation signal.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// What to send.
    pub config: RequestConfig,
    /// Caller-supplied cancellation, independent of the timeout.
    pub signal: Option<CancellationSignal>,
}

impl RequestContext {
    /// Creates a context without an external signal.
    #[must_use]
    pub const fn new(config: RequestConfig) -> Self {
        Self {
            config,
            signal: None,
        }
    }

    /// Attaches an external cancellation signal.
    #[must_use]
    pub fn with_signal(mut self, signal: Option<CancellationSignal>) -> Self {
        self.signal = signal;
        self
    }

    /// The signal that should abort this call: the timeout combined with the
    /// caller's signal.
    ///
    /// Must be called from within a tokio runtime when a timeout is set.
    #[must_use]
    pub fn effective_signal(&self) -> Option<CancellationSignal> {
        CancellationSignal::for_request(self.config.timeout_ms, self.signal.clone())
    }
}
