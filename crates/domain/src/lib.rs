//! Pokefetch Domain - Core types
//!
//! This crate defines the request/response shapes, cache hints, structured
//! errors and the recency store used by the pokefetch clients.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod graphql;
pub mod history;
pub mod outcome;
pub mod request;
pub mod response;

pub use error::{DomainError, DomainResult};
pub use graphql::{GraphqlError, GraphqlErrorLocation, GraphqlRequest, GraphqlResponse, OperationKind};
pub use history::{DEFAULT_HISTORY_SIZE, HistoryItem, RecentHistory, ViewedItem, ViewedKind};
pub use outcome::ActionResult;
pub use request::{CacheHints, Header, Headers, HttpMethod, RequestConfig, Revalidate};
pub use response::{ApiError, StatusCode};
