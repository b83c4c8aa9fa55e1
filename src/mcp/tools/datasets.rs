//! Dataset Tools
//!
//! Search, schema discovery and chart queries over data.gouv.fr datasets.
//! Upstream failures come back as `isError` results with a readable message;
//! malformed arguments are rejected as invalid params.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::datagouv::explorer::{DEFAULT_QUERY_LIMIT, DEFAULT_SEARCH_PAGE_SIZE};
use crate::datagouv::DataGouvError;
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};

pub const MAX_SEARCH_PAGE_SIZE: u32 = 20;
pub const MAX_QUERY_LIMIT: u32 = 50;

const WORKFLOW: &str = "WORKFLOW: search-datasets -> get-dataset-schema -> query-dataset";

/// Register dataset tools with the registry, in workflow order
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(search_datasets_tool());
    registry.register_tool(get_dataset_schema_tool());
    registry.register_tool(query_dataset_tool());
    registry.register_tool(query_tabular_data_tool());
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, McpError> {
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn check_range(name: &str, value: u32, max: u32) -> Result<u32, McpError> {
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(McpError::InvalidParams(format!(
            "{} must be between 1 and {}, got {}",
            name, max, value
        )))
    }
}

fn require_non_empty<'a>(name: &str, value: &'a str) -> Result<&'a str, McpError> {
    if value.is_empty() {
        Err(McpError::InvalidParams(format!("{} must not be empty", name)))
    } else {
        Ok(value)
    }
}

fn upstream_failure(tool: &str, err: DataGouvError) -> ToolResult {
    warn!(tool, error = %err, "Tool call failed");
    Ok(ToolsCallResult::error(format!("Error: {}", err)))
}

fn internal(e: serde_json::Error) -> McpError {
    McpError::InternalError(e.to_string())
}

// ============================================================================
// search-datasets
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchDatasetsParams {
    query: String,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_SEARCH_PAGE_SIZE
}

fn search_datasets_tool() -> RegisteredTool {
    ToolBuilder::new("search-datasets")
        .description(format!(
            "Searches French public datasets on data.gouv.fr. Returns the dataset_id needed \
             for visualization.\n{}\nNEXT STEP: call get-dataset-schema with a dataset_id to \
             discover its columns, then query-dataset to generate a bar chart.",
            WORKFLOW
        ))
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Search terms"
                },
                "page_size": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_SEARCH_PAGE_SIZE,
                    "default": DEFAULT_SEARCH_PAGE_SIZE,
                    "description": "Number of datasets to return"
                }
            },
            "required": ["query"]
        }))
        .build(search_datasets_handler)
}

async fn search_datasets_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: SearchDatasetsParams = parse_params(params)?;
    let query = require_non_empty("query", &params.query)?;
    let page_size = check_range("page_size", params.page_size, MAX_SEARCH_PAGE_SIZE)?;

    let outcome = match ctx.explorer.search_datasets(query, page_size).await {
        Ok(outcome) => outcome,
        Err(e) => return upstream_failure("search-datasets", e),
    };

    let summary = format!(
        "{} datasets found for \"{}\". Use get-dataset-schema with a dataset_id to discover \
         the available columns.",
        outcome.total, outcome.query
    );
    ToolsCallResult::structured(&outcome, summary).map_err(internal)
}

// ============================================================================
// get-dataset-schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct DatasetSchemaParams {
    dataset_id: String,
}

fn get_dataset_schema_tool() -> RegisteredTool {
    ToolBuilder::new("get-dataset-schema")
        .description(format!(
            "Discovers the columns available in a dataset. Call this before query-dataset.\n\
             Returns resource ids and their column names.\n{}\nUse the returned column names \
             as the [category, value] columns of query-dataset.",
            WORKFLOW
        ))
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "dataset_id": {
                    "type": "string",
                    "description": "data.gouv.fr dataset id (from search-datasets results)"
                }
            },
            "required": ["dataset_id"]
        }))
        .build(get_dataset_schema_handler)
}

async fn get_dataset_schema_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DatasetSchemaParams = parse_params(params)?;
    let dataset_id = require_non_empty("dataset_id", &params.dataset_id)?;

    let schema = match ctx.explorer.get_dataset_schema(dataset_id).await {
        Ok(schema) => schema,
        Err(e) => return upstream_failure("get-dataset-schema", e),
    };

    let text = serde_json::to_string_pretty(&schema).map_err(internal)?;
    ToolsCallResult::structured(&schema, text).map_err(internal)
}

// ============================================================================
// query-dataset
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryDatasetParams {
    dataset_id: String,
    #[serde(default)]
    resource_id: Option<String>,
    columns: Vec<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_QUERY_LIMIT
}

fn query_dataset_tool() -> RegisteredTool {
    ToolBuilder::new("query-dataset")
        .description(format!(
            "Generates an interactive bar chart from French public data.\n{}\nIMPORTANT: call \
             get-dataset-schema first to discover the exact column names.\nRequires dataset_id \
             and columns [category_column, value_column].",
            WORKFLOW
        ))
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "dataset_id": {
                    "type": "string",
                    "description": "data.gouv.fr dataset id"
                },
                "resource_id": {
                    "type": "string",
                    "description": "Resource id (optional, defaults to the first CSV/Parquet resource)"
                },
                "columns": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Columns to chart: [category, value]"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_QUERY_LIMIT,
                    "default": DEFAULT_QUERY_LIMIT,
                    "description": "Maximum number of rows to fetch"
                }
            },
            "required": ["dataset_id", "columns"]
        }))
        .build(query_dataset_handler)
}

async fn query_dataset_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: QueryDatasetParams = parse_params(params)?;
    let dataset_id = require_non_empty("dataset_id", &params.dataset_id)?;
    let limit = check_range("limit", params.limit, MAX_QUERY_LIMIT)?;
    // An empty resource id means "pick one for me".
    let resource_id = params.resource_id.as_deref().filter(|id| !id.is_empty());

    let payload = match ctx
        .explorer
        .query_dataset(dataset_id, &params.columns, resource_id, limit)
        .await
    {
        Ok(payload) => payload,
        Err(e) => return upstream_failure("query-dataset", e),
    };

    let summary = format!(
        "Chart generated: {} ({} data points)",
        payload.title,
        payload.chart.labels.len()
    );
    ToolsCallResult::structured(&payload, summary).map_err(internal)
}

// ============================================================================
// query-tabular-data
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryTabularDataParams {
    resource_id: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn query_tabular_data_tool() -> RegisteredTool {
    ToolBuilder::new("query-tabular-data")
        .description(
            "Returns the first rows of a CSV/Parquet resource as served by the data.gouv.fr \
             tabular API, with pagination metadata. Useful to inspect raw values before charting.",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "resource_id": {
                    "type": "string",
                    "description": "Resource id (from get-dataset-schema results)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_QUERY_LIMIT,
                    "default": DEFAULT_QUERY_LIMIT,
                    "description": "Maximum number of rows to fetch"
                }
            },
            "required": ["resource_id"]
        }))
        .build(query_tabular_data_handler)
}

async fn query_tabular_data_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: QueryTabularDataParams = parse_params(params)?;
    let resource_id = require_non_empty("resource_id", &params.resource_id)?;
    let limit = check_range("limit", params.limit, MAX_QUERY_LIMIT)?;

    let outcome = match ctx.explorer.query_tabular_data(resource_id, limit).await {
        Ok(outcome) => outcome,
        Err(e) => return upstream_failure("query-tabular-data", e),
    };

    let summary = format!(
        "{} rows returned (total {})",
        outcome.data.len(),
        outcome.meta.total
    );
    ToolsCallResult::structured(&outcome, summary).map_err(internal)
}
