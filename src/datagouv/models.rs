//! Models for the data.gouv.fr and tabular API responses.
//!
//! The `Raw*` types mirror the loosely-typed upstream JSON: every field is
//! optional. Each public entity has exactly one normalization function that
//! turns its raw counterpart into a fully-populated value, so defaults live
//! here and nowhere else.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of characters kept from a dataset description.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Organization name used when a dataset has none.
pub const UNKNOWN_ORGANIZATION: &str = "Inconnu";

/// Title used when a resource has none.
pub const UNTITLED_RESOURCE: &str = "Untitled";

/// Formats the tabular API can serve rows for.
pub const TABULAR_FORMATS: [&str; 2] = ["csv", "parquet"];

/// One row of a tabular resource. Columns vary per dataset.
pub type TabularRow = Map<String, Value>;

// =============================================================================
// Search
// =============================================================================

/// A dataset matched by a free-text search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub organization: String,
    pub url: String,
    pub last_modified: String,
    pub resources_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub datasets: Vec<DatasetSummary>,
    pub total: u64,
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearchPage {
    #[serde(default)]
    pub data: Option<Vec<RawDataset>>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDataset {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub organization: Option<RawOrganization>,
    /// Public page of the dataset on data.gouv.fr.
    pub page: Option<String>,
    pub last_modified: Option<String>,
    pub resources: Option<Vec<IgnoredAny>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawOrganization {
    pub name: Option<String>,
}

impl DatasetSummary {
    pub(crate) fn from_raw(raw: RawDataset) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            description: raw
                .description
                .map(|d| truncate_chars(&d, DESCRIPTION_MAX_CHARS))
                .unwrap_or_default(),
            organization: raw
                .organization
                .and_then(|o| o.name)
                .unwrap_or_else(|| UNKNOWN_ORGANIZATION.to_string()),
            url: raw.page.unwrap_or_default(),
            last_modified: raw.last_modified.unwrap_or_default(),
            resources_count: raw.resources.map(|r| r.len()).unwrap_or(0),
        }
    }
}

impl SearchOutcome {
    pub(crate) fn from_raw(raw: RawSearchPage, query: &str) -> Self {
        let datasets: Vec<DatasetSummary> = raw
            .data
            .unwrap_or_default()
            .into_iter()
            .map(DatasetSummary::from_raw)
            .collect();

        // `total` counts every match, so it can never be below what we hold.
        let returned = datasets.len() as u64;
        let total = raw.total.unwrap_or(returned).max(returned);

        Self {
            datasets,
            total,
            query: query.to_string(),
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

// =============================================================================
// Dataset metadata
// =============================================================================

/// A downloadable file attached to a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    /// Lowercased; empty when upstream did not report one.
    pub format: String,
    pub url: String,
}

impl Resource {
    /// True when the tabular API can serve rows for this resource.
    pub fn is_tabular(&self) -> bool {
        TABULAR_FORMATS.contains(&self.format.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub title: String,
    pub last_modified: String,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDatasetDetail {
    pub id: Option<String>,
    pub title: Option<String>,
    pub last_modified: Option<String>,
    pub resources: Option<Vec<RawResource>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawResource {
    pub id: Option<String>,
    pub title: Option<String>,
    pub format: Option<String>,
    pub url: Option<String>,
}

impl Resource {
    pub(crate) fn from_raw(raw: RawResource) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_else(|| UNTITLED_RESOURCE.to_string()),
            format: raw.format.map(|f| f.to_lowercase()).unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        }
    }
}

impl DatasetInfo {
    pub(crate) fn from_raw(raw: RawDatasetDetail) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            last_modified: raw.last_modified.unwrap_or_default(),
            resources: raw
                .resources
                .unwrap_or_default()
                .into_iter()
                .map(Resource::from_raw)
                .collect(),
        }
    }
}

// =============================================================================
// Tabular rows
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabularMeta {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabularOutcome {
    pub data: Vec<TabularRow>,
    pub meta: TabularMeta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTabularPage {
    pub data: Option<Vec<TabularRow>>,
    pub meta: Option<RawTabularMeta>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTabularMeta {
    pub total: Option<u64>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl TabularOutcome {
    pub(crate) fn from_raw(raw: RawTabularPage, limit: u32) -> Self {
        let meta = raw.meta.unwrap_or_default();
        let meta = TabularMeta {
            total: meta.total.unwrap_or(0),
            page: meta.page.unwrap_or(1),
            page_size: meta.page_size.unwrap_or(u64::from(limit)),
        };

        let mut data = raw.data.unwrap_or_default();
        data.truncate(usize::try_from(meta.page_size).unwrap_or(usize::MAX));

        Self { data, meta }
    }
}

// =============================================================================
// Column profiles
// =============================================================================

/// Extract column names from a profile response.
///
/// Two shapes are understood, tried in order: `{"profile": [{"name": ..}]}`
/// and `{"columns": [..]}` where entries are either bare names or
/// descriptors with a `name`. Anything else yields no columns.
pub fn profile_columns(body: &Value) -> Vec<String> {
    if let Some(profile) = body.get("profile").and_then(Value::as_array) {
        return profile
            .iter()
            .filter_map(|col| col.get("name"))
            .filter_map(non_empty_name)
            .collect();
    }

    if let Some(columns) = body.get("columns").and_then(Value::as_array) {
        return columns
            .iter()
            .filter_map(|col| match col.get("name") {
                Some(name) if is_truthy(name) => non_empty_name(name),
                _ => non_empty_name(col),
            })
            .collect();
    }

    Vec::new()
}

fn non_empty_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// =============================================================================
// Orchestrated outputs
// =============================================================================

/// Column listing for one tabular resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub id: String,
    pub title: String,
    pub format: String,
    /// Empty when profiling failed or returned nothing usable.
    pub columns: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub dataset_id: String,
    pub title: String,
    pub resources: Vec<ResourceSchema>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Name of the value column.
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSource {
    pub dataset_id: String,
    pub resource_id: String,
    pub last_modified: String,
}

/// Chart-ready series plus provenance, as handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub title: String,
    pub dataset_url: String,
    pub chart: ChartSeries,
    pub source: ChartSource,
}
