//! MCP HTTP Handler
//!
//! Each `POST /mcp` body holds one JSON-RPC message; the response body holds
//! the JSON-RPC reply. Notifications are acknowledged with `202 Accepted`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use super::context::ToolContext;
use super::protocol::{
    methods, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult,
    RequestId, ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability, ToolsListResult,
    JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use super::registry::McpRegistry;
use crate::datagouv::DatasetExplorer;
use crate::SERVER_VERSION;

/// Name reported in the `initialize` handshake.
pub const SERVER_NAME: &str = "datagouv";

/// State shared across MCP requests
pub struct McpState {
    pub registry: Arc<McpRegistry>,
    pub context: ToolContext,
}

pub type GuardedMcpState = Arc<McpState>;

/// HTTP entry point for MCP messages
pub async fn mcp_handler(State(mcp_state): State<GuardedMcpState>, body: String) -> Response {
    match handle_message(&body, &mcp_state).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle a single MCP message. Returns `None` for notifications.
pub async fn handle_message(text: &str, mcp_state: &McpState) -> Option<McpResponse> {
    let raw: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Some(McpResponse::error(
                None,
                McpError::ParseError(e.to_string()),
            ));
        }
    };

    let request: McpRequest = match serde_json::from_value(raw.clone()) {
        Ok(req) => req,
        Err(e) => {
            let id = raw
                .get("id")
                .cloned()
                .and_then(|id| serde_json::from_value::<RequestId>(id).ok());
            return Some(McpResponse::error(
                id,
                McpError::InvalidRequest(e.to_string()),
            ));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(McpResponse::error(
            request.id,
            McpError::InvalidRequest(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
        ));
    }

    let request_id = match request.id.clone() {
        Some(id) => id,
        None => {
            // Notification, no response needed
            debug!("Received notification {}", request.method);
            return None;
        }
    };

    debug!("MCP request {}", request.method);

    // Dispatch based on method
    let result = match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&request),
        methods::INITIALIZED => return None,
        methods::PING => handle_ping(),
        methods::TOOLS_LIST => handle_tools_list(mcp_state),
        methods::TOOLS_CALL => handle_tools_call(&request, mcp_state).await,
        other => Err(McpError::MethodNotFound(other.to_string())),
    };

    Some(match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => McpResponse::error(Some(request_id), error),
    })
}

fn handle_initialize(request: &McpRequest) -> Result<Value, McpError> {
    let params: InitializeParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .unwrap_or_default();

    if let Some(client) = &params.client_info {
        info!(
            "MCP client {} {} connected (protocol {})",
            client.name,
            client.version.as_deref().unwrap_or("unknown"),
            params.protocol_version.as_deref().unwrap_or("unknown")
        );
    }

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability { list_changed: None }),
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_ping() -> Result<Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_tools_list(mcp_state: &McpState) -> Result<Value, McpError> {
    let result = ToolsListResult {
        tools: mcp_state.registry.get_tools(),
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(request: &McpRequest, mcp_state: &McpState) -> Result<Value, McpError> {
    let params: ToolsCallParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

    let tool = mcp_state
        .registry
        .get_tool(&params.name)
        .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

    let arguments = params.arguments.unwrap_or(serde_json::json!({}));
    let result = (tool.handler)(mcp_state.context.clone(), arguments).await?;

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

/// Create the MCP state with every tool registered
pub fn create_mcp_state(explorer: Arc<DatasetExplorer>) -> McpState {
    let mut registry = McpRegistry::new();

    super::tools::register_all_tools(&mut registry);

    info!(
        "MCP registry initialized with {} tools",
        registry.tool_count()
    );

    McpState {
        registry: Arc::new(registry),
        context: ToolContext { explorer },
    }
}
