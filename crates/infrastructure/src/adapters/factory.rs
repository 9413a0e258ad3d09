//! Builds the transport selected in [`Settings`].

use std::sync::Arc;

use pokefetch_application::{ClientError, GraphqlAdapter, RestAdapter};
use tracing::info;

use super::in_memory::{FixtureError, InMemoryAdapter};
use super::reqwest_adapter::ReqwestAdapter;
use crate::config::{AdapterKind, Settings};

/// Errors raised while building adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] ClientError),

    /// The fixture file could not be loaded.
    #[error(transparent)]
    Fixtures(#[from] FixtureError),
}

/// Adapters for both facades, sharing one transport.
#[derive(Clone)]
pub struct Adapters {
    /// Transport for [`RestClient`](pokefetch_application::RestClient).
    pub rest: Arc<dyn RestAdapter>,
    /// Transport for [`GraphqlClient`](pokefetch_application::GraphqlClient).
    pub graphql: Arc<dyn GraphqlAdapter>,
}

impl Adapters {
    fn shared<A>(adapter: A) -> Self
    where
        A: RestAdapter + GraphqlAdapter + 'static,
    {
        let adapter = Arc::new(adapter);
        Self {
            rest: adapter.clone(),
            graphql: adapter,
        }
    }
}

impl std::fmt::Debug for Adapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapters")
            .field("rest", &self.rest.name())
            .field("graphql", &self.graphql.name())
            .finish()
    }
}

/// Creates the adapters selected by `settings.adapter`.
///
/// # Errors
///
/// Returns an error if the reqwest client cannot be built or the fixture
/// file cannot be loaded.
pub async fn create_adapters(settings: &Settings) -> Result<Adapters, AdapterError> {
    let adapters = match settings.adapter {
        AdapterKind::Reqwest => Adapters::shared(ReqwestAdapter::new()?),
        AdapterKind::InMemory => match &settings.fixtures {
            Some(path) => Adapters::shared(InMemoryAdapter::load(path).await?),
            None => Adapters::shared(InMemoryAdapter::new()),
        },
    };
    info!(adapter = %settings.adapter, "transport ready");
    Ok(adapters)
}
