//! MCP (Model Context Protocol) Server
//!
//! Exposes the data.gouv.fr workflow as tools that LLM clients can call.
//!
//! ## Architecture
//!
//! - Transport: JSON-RPC over HTTP `POST /mcp`, one message per request
//! - Tools: `search-datasets`, `get-dataset-schema`, `query-dataset`, `query-tabular-data`
//! - Failures of the upstream APIs are returned as `isError` tool results

pub mod context;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod tools;

pub use handler::{create_mcp_state, mcp_handler, GuardedMcpState, McpState};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::McpRegistry;
