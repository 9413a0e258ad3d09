//! Shared HTTP response handling for all adapters.

mod translate;

pub use translate::{translate_graphql_response, translate_response};
