//! JSON helpers shared by fixture loading and command output.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_pretty};
