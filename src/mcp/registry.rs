//! MCP Tool Registry
//!
//! Manages registration and lookup of tools.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::context::ToolContext;
use super::protocol::{McpError, ToolDefinition, ToolsCallResult};

// ============================================================================
// Tool Types
// ============================================================================

/// Result type for tool execution
pub type ToolResult = Result<ToolsCallResult, McpError>;

/// Boxed future for async tool execution
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Tool handler function type
pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> ToolFuture + Send + Sync>;

/// A registered tool with metadata and handler
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

impl RegisteredTool {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Registry for MCP tools. Tools are listed in registration order.
pub struct McpRegistry {
    tools: Vec<RegisteredTool>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool, replacing any previous tool with the same name
    pub fn register_tool(&mut self, tool: RegisteredTool) {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(RegisteredTool::definition).collect()
    }

    pub fn get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Get the number of registered tools
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for McpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder helpers
// ============================================================================

/// Builder for registering a tool
pub struct ToolBuilder {
    name: String,
    description: String,
    input_schema: Value,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
            handler: Arc::new(move |ctx, params| Box::pin(handler(ctx, params))),
        }
    }
}
