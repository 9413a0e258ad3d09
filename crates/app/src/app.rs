//! Command handlers over explicitly wired clients.

use std::sync::Arc;

use pokefetch_application::{
    ClientError, FetchResultExt, GraphqlClient, GraphqlOptions, HistoryError, HistoryService,
    KeyValueStorage, RequestOptions, RestClient, StorageError,
};
use pokefetch_domain::{
    ActionResult, CacheHints, DomainError, GraphqlResponse, OperationKind, Revalidate, ViewedItem,
    ViewedKind,
};
use pokefetch_infrastructure::{
    AdapterError, Adapters, FileStorage, Settings, SettingsError, create_adapters,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

const POKEMON_CACHE_TAG: &str = "pokemon";
const POKEMON_REVALIDATE_SECS: u64 = 3600;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings are missing or malformed.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The transport could not be built.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Local storage is unavailable.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// History could not be loaded or saved.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// A request failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An argument is malformed.
    #[error(transparent)]
    Input(#[from] DomainError),

    /// GraphQL variables are not valid JSON.
    #[error("invalid GraphQL variables: {0}")]
    InvalidVariables(#[source] serde_json::Error),

    /// A GraphQL command was issued without a CMS endpoint.
    #[error("no CMS endpoint configured, set POKEFETCH_GRAPHQL_URL")]
    CmsNotConfigured,
}

/// The wired application.
pub struct App {
    pokeapi: RestClient,
    cms: Option<GraphqlClient>,
    history: HistoryService<ViewedItem>,
}

impl App {
    /// Builds the transport and storage selected by `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport or storage cannot be created, or the
    /// history cannot be read.
    pub async fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let adapters = create_adapters(settings).await?;
        let storage = match &settings.history_dir {
            Some(dir) => FileStorage::new(dir),
            None => FileStorage::in_config_dir()?,
        };
        debug!(dir = %storage.dir().display(), "history storage");

        Self::new(settings, adapters, Arc::new(storage)).await
    }

    /// Wires clients over the given adapters and storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    pub async fn new(
        settings: &Settings,
        adapters: Adapters,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self, AppError> {
        let pokeapi = RestClient::new(settings.rest_base_url.clone(), adapters.rest)
            .with_timeout_ms(settings.timeout_ms)
            .with_cache(
                CacheHints::tagged([POKEMON_CACHE_TAG])
                    .with_revalidate(Revalidate::Seconds(POKEMON_REVALIDATE_SECS)),
            );

        let cms = settings.graphql_url.as_deref().map(|url| {
            let client =
                GraphqlClient::new(url, adapters.graphql.clone()).with_timeout_ms(settings.timeout_ms);
            match &settings.cms_token {
                Some(token) => client.with_bearer_token(token),
                None => client,
            }
        });

        let history = HistoryService::load(storage, settings.history_size).await?;

        Ok(Self {
            pokeapi,
            cms,
            history,
        })
    }

    /// Fetches a Pokemon and records it as recently viewed.
    ///
    /// Upstream failures are reported in the returned [`ActionResult`]; only
    /// bad input and history persistence fail the call.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty name or when history cannot be saved.
    pub async fn pokemon(&mut self, name: &str) -> Result<ActionResult<Value>, AppError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() || name.contains('/') {
            return Err(DomainError::InvalidIdentifier(name).into());
        }

        let options = RequestOptions::new().tag(format!("pokemon-{name}"));
        let result = self
            .pokeapi
            .get::<Value>(&format!("/pokemon/{name}"), options)
            .await
            .into_action_result();

        if let Some(data) = &result.data {
            let item = viewed_pokemon(&name, data);
            info!(id = %item.id, name = %item.name, "viewed pokemon");
            self.history.record(item).await?;
        }

        Ok(result)
    }

    /// Runs a GraphQL operation against the CMS.
    ///
    /// # Errors
    ///
    /// Returns an error if no CMS is configured, the arguments are malformed,
    /// or the request fails.
    pub async fn graphql(
        &self,
        kind: &str,
        document: &str,
        variables: Option<&str>,
        operation_name: Option<&str>,
    ) -> Result<GraphqlResponse<Value>, AppError> {
        let cms = self.cms.as_ref().ok_or(AppError::CmsNotConfigured)?;
        let kind: OperationKind = kind.parse()?;
        let variables = variables
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(AppError::InvalidVariables)?;

        let mut options = GraphqlOptions::new();
        if let Some(name) = operation_name {
            options = options.operation_name(name);
        }

        Ok(cms.execute(kind, document, variables, options).await?)
    }

    /// Returns recently viewed items, newest first, optionally clearing
    /// them first.
    ///
    /// # Errors
    ///
    /// Returns an error if clearing cannot be persisted.
    pub async fn history(&mut self, clear: bool) -> Result<Vec<ViewedItem>, AppError> {
        if clear {
            self.history.clear().await?;
            info!("history cleared");
        }
        Ok(self.history.entries().iter().cloned().collect())
    }
}

fn viewed_pokemon(requested: &str, data: &Value) -> ViewedItem {
    let id = data
        .get("id")
        .map(|id| id.as_str().map_or_else(|| id.to_string(), str::to_string))
        .unwrap_or_else(|| requested.to_string());
    let name = data
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(requested);

    let item = ViewedItem::new(id, name, ViewedKind::Pokemon);
    match data
        .pointer("/sprites/front_default")
        .and_then(Value::as_str)
    {
        Some(url) => item.with_image_url(url),
        None => item,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pokefetch_domain::HttpMethod;
    use pokefetch_infrastructure::{Fixture, InMemoryAdapter, MemoryStorage};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const BASE: &str = "https://pokeapi.test/api/v2";
    const CMS: &str = "https://cms.test/graphql";

    fn settings() -> Settings {
        Settings {
            rest_base_url: BASE.into(),
            graphql_url: Some("https://cms.test".into()),
            cms_token: Some("t0ken".into()),
            ..Settings::default()
        }
    }

    fn fixtures() -> InMemoryAdapter {
        InMemoryAdapter::with_fixtures(vec![
            Fixture::json(
                HttpMethod::Get,
                format!("{BASE}/pokemon/pikachu"),
                200,
                json!({
                    "id": 25,
                    "name": "pikachu",
                    "sprites": { "front_default": "https://img.test/25.png" }
                }),
            ),
            Fixture::json(
                HttpMethod::Get,
                format!("{BASE}/pokemon/eevee"),
                200,
                json!({ "id": 133, "name": "eevee" }),
            ),
            Fixture::json(
                HttpMethod::Get,
                format!("{BASE}/pokemon/bulbasaur"),
                503,
                json!({ "message": "rate limited" }),
            ),
            Fixture::json(HttpMethod::Post, CMS, 200, json!({ "data": { "posts": [] } })),
        ])
    }

    async fn app() -> (App, Arc<InMemoryAdapter>) {
        let adapter = Arc::new(fixtures());
        let adapters = Adapters {
            rest: adapter.clone(),
            graphql: adapter.clone(),
        };
        let app = App::new(&settings(), adapters, Arc::new(MemoryStorage::new()))
            .await
            .unwrap();
        (app, adapter)
    }

    fn ids(items: &[ViewedItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_pokemon_is_fetched_and_recorded() {
        let (mut app, adapter) = app().await;

        let result = app.pokemon(" Pikachu ").await.unwrap();

        assert!(result.success);
        assert_eq!(result.data.unwrap()["name"], "pikachu");

        let history = app.history(false).await.unwrap();
        assert_eq!(ids(&history), vec!["25"]);
        assert_eq!(history[0].image_url.as_deref(), Some("https://img.test/25.png"));

        let request = &adapter.requests()[0].config;
        assert_eq!(request.cache.tags, vec!["pokemon", "pokemon-pikachu"]);
        assert_eq!(request.cache.revalidate, Some(Revalidate::Seconds(3600)));
    }

    #[tokio::test]
    async fn test_missing_pokemon_is_not_found_and_not_recorded() {
        let (mut app, _) = app().await;

        let result = app.pokemon("missingno").await.unwrap();

        assert!(result.is_not_found());
        assert!(app.history(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported_in_result() {
        let (mut app, _) = app().await;

        let result = app.pokemon("bulbasaur").await.unwrap();

        assert!(!result.success);
        assert!(!result.is_not_found());
        assert_eq!(result.error.as_deref(), Some("rate limited (HTTP 503)"));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let (mut app, _) = app().await;

        assert!(matches!(app.pokemon("  ").await, Err(AppError::Input(_))));
    }

    #[tokio::test]
    async fn test_history_order_and_clear() {
        let (mut app, _) = app().await;
        for name in ["pikachu", "eevee", "pikachu"] {
            app.pokemon(name).await.unwrap();
        }

        assert_eq!(ids(&app.history(false).await.unwrap()), vec!["25", "133"]);
        assert!(app.history(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_graphql_uses_cms_endpoint_and_token() {
        let (app, adapter) = app().await;

        let response = app
            .graphql("query", "{ posts { id } }", Some(r#"{"first":1}"#), None)
            .await
            .unwrap();

        assert_eq!(response.data, Some(json!({ "posts": [] })));
        let recorded = &adapter.requests()[0];
        assert_eq!(recorded.config.url, CMS);
        assert_eq!(recorded.config.headers.get("authorization"), Some("Bearer t0ken"));
        assert_eq!(
            recorded.body,
            Some(json!({ "query": "{ posts { id } }", "variables": { "first": 1 } }))
        );
    }

    #[tokio::test]
    async fn test_graphql_rejects_unknown_kind() {
        let (app, _) = app().await;

        assert!(matches!(
            app.graphql("fragment", "{ a }", None, None).await,
            Err(AppError::Input(_))
        ));
    }

    #[tokio::test]
    async fn test_graphql_rejects_malformed_variables() {
        let (app, adapter) = app().await;

        let result = app.graphql("query", "{ a }", Some("{oops"), None).await;

        assert!(matches!(result, Err(AppError::InvalidVariables(_))));
        assert!(adapter.requests().is_empty());
    }

    #[tokio::test]
    async fn test_graphql_without_cms_fails() {
        let adapter = Arc::new(fixtures());
        let adapters = Adapters {
            rest: adapter.clone(),
            graphql: adapter,
        };
        let app = App::new(&Settings::default(), adapters, Arc::new(MemoryStorage::new()))
            .await
            .unwrap();

        assert!(matches!(
            app.graphql("query", "{ a }", None, None).await,
            Err(AppError::CmsNotConfigured)
        ));
    }
}
