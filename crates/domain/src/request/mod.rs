//! HTTP request domain types

mod cache;
mod config;
mod header;
mod method;

pub use cache::{CacheHints, Revalidate};
pub use config::RequestConfig;
pub use header::{Header, Headers};
pub use method::HttpMethod;
