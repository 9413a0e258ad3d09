//! Pokefetch Infrastructure - transports, settings and storage
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer: a reqwest transport, a fixture-backed transport, and
//! file or in-memory key/value storage.

pub mod adapters;
pub mod config;
pub mod http;
pub mod persistence;
pub mod serialization;

pub use adapters::{
    AdapterError, Adapters, Fixture, FixtureError, InMemoryAdapter, RecordedRequest,
    ReqwestAdapter, create_adapters,
};
pub use config::{AdapterKind, DEFAULT_REST_BASE_URL, Settings, SettingsError};
pub use http::{translate_graphql_response, translate_response};
pub use persistence::{FileStorage, MemoryStorage};
pub use serialization::{SerializationError, from_json_bytes, to_json_pretty};
