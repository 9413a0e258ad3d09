//! Pokefetch Application - Client facades and ports
//!
//! This crate defines the application layer with:
//! - Port traits for transports and local storage
//! - Cancellation signals with timeout derivation and combination
//! - The REST and GraphQL client facades
//! - The persisted recently-viewed history

pub mod cancellation;
pub mod endpoint;
pub mod error;
pub mod graphql_client;
pub mod history_service;
pub mod options;
pub mod ports;
pub mod rest_client;

pub use cancellation::{CancelReason, CancellationSignal, with_cancellation};
pub use endpoint::{graphql_endpoint, join_url};
pub use error::{ClientError, ClientResult, FetchResultExt};
pub use graphql_client::GraphqlClient;
pub use history_service::{HISTORY_STORAGE_KEY, HistoryError, HistoryService};
pub use options::{GraphqlOptions, RequestOptions};
pub use ports::{GraphqlAdapter, KeyValueStorage, RequestContext, RestAdapter, StorageError};
pub use rest_client::RestClient;
