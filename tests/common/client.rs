//! JSON-RPC client for end-to-end tests
//!
//! Wraps reqwest and speaks MCP over `POST /mcp`.
//! When the transport or message format changes, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub struct McpClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    next_id: AtomicU64,
}

impl McpClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            next_id: AtomicU64::new(1),
        }
    }

    /// Posts a raw body to the MCP endpoint
    pub async fn post_raw(&self, body: impl Into<String>) -> Response {
        self.client
            .post(format!("{}/mcp", self.base_url))
            .header("content-type", "application/json")
            .body(body.into())
            .send()
            .await
            .expect("MCP request failed")
    }

    /// Sends a request and returns the whole JSON-RPC response
    pub async fn request(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self.post_raw(body.to_string()).await;
        assert!(response.status().is_success());
        let value: Value = response.json().await.expect("Response is not JSON");
        assert_eq!(value["id"], id);
        value
    }

    /// Sends a notification; the server answers with an empty 202
    pub async fn notify(&self, method: &str) -> Response {
        let body = json!({"jsonrpc": "2.0", "method": method});
        self.post_raw(body.to_string()).await
    }

    pub async fn initialize(&self) -> Value {
        self.request(
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "e2e-tests", "version": "0.0.1"}
            }),
        )
        .await
    }

    pub async fn list_tools(&self) -> Value {
        self.request("tools/list", json!({})).await
    }

    /// Calls a tool and returns the JSON-RPC response (result or error)
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        self.request("tools/call", json!({"name": name, "arguments": arguments}))
            .await
    }

    /// Calls a tool that is expected to succeed and returns its result
    pub async fn call_tool_ok(&self, name: &str, arguments: Value) -> Value {
        let response = self.call_tool(name, arguments).await;
        assert!(
            response.get("error").is_none(),
            "Unexpected JSON-RPC error: {}",
            response
        );
        let result = response["result"].clone();
        assert_eq!(result["isError"], false, "Tool failed: {}", result);
        result
    }

    /// Text of the first content block of a tool result
    pub fn text(result: &Value) -> String {
        result["content"][0]["text"]
            .as_str()
            .expect("Tool result has no text content")
            .to_string()
    }
}
