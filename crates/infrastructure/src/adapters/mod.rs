//! Transport adapters implementing the client ports.

mod factory;
mod in_memory;
mod reqwest_adapter;

pub use factory::{AdapterError, Adapters, create_adapters};
pub use in_memory::{Fixture, FixtureError, InMemoryAdapter, RecordedRequest};
pub use reqwest_adapter::ReqwestAdapter;
