//! Key/value storage backends.
//!
//! [`FileStorage`] keeps one file per key in the platform config directory:
//! - Linux: ~/.config/pokefetch/<key>.json
//! - macOS: ~/Library/Application Support/pokefetch/<key>.json
//! - Windows: %APPDATA%/pokefetch/<key>.json
//!
//! [`MemoryStorage`] keeps values for the lifetime of the process.

mod file_storage;
mod memory_storage;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
