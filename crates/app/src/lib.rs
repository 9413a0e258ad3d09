//! Pokefetch - command layer
//!
//! Wires the clients, transports and history store together from
//! [`Settings`](pokefetch_infrastructure::Settings). Everything is built once
//! by the caller and passed in; nothing here is global.

mod app;
pub mod cli;

pub use app::{App, AppError};
