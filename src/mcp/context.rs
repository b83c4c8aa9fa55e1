//! MCP Tool Execution Context

use std::sync::Arc;

use crate::datagouv::DatasetExplorer;

/// Context provided to tool handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// The dataset workflow backed by the upstream APIs
    pub explorer: Arc<DatasetExplorer>,
}
