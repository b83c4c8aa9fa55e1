//! datagouv MCP server library
//!
//! Exposes the data.gouv.fr access layer and the MCP server for testing and reuse.

pub mod config;
pub mod datagouv;
pub mod mcp;
pub mod server;

/// Crate version and the git revision it was built from.
pub const SERVER_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

// Re-export commonly used types for convenience
pub use datagouv::{ApiEndpoints, DataGouvClient, DataGouvError, DatasetExplorer, OpenDataApi};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
