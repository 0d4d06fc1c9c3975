//! HTTP API module.
//!
//! Upload a file, inspect the resulting table, download it as CSV or XLSX,
//! and follow pipeline logs live.

pub mod logs;
pub mod server;
pub mod state;
pub mod types;

pub use logs::*;
pub use server::{router, start_server, ServerConfig};
pub use state::{AppState, Table};
pub use types::*;
