//! MCP Tools

pub mod datasets;

use super::registry::McpRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    datasets::register_tools(registry);
}
