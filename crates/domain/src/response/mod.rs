//! HTTP response types

mod api_error;
mod status;

pub use api_error::ApiError;
pub use status::StatusCode;
