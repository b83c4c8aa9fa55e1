//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{McpClient, TestServer};
//!
//! #[tokio::test]
//! async fn test_list_tools() {
//!     let server = TestServer::spawn().await;
//!     let client = McpClient::new(server.base_url.clone());
//!
//!     let response = client.list_tools().await;
//!     assert!(response["result"]["tools"].is_array());
//! }
//! ```

mod client;
mod constants;
mod server;
mod upstream;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::McpClient;
pub use constants::*;
#[allow(unused_imports)]
pub use server::TestServer;
#[allow(unused_imports)]
pub use upstream::{FakeUpstream, DATASET_PAGE_BASE};
