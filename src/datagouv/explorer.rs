//! Dataset exploration workflow: search, schema discovery, chart queries.
//!
//! Schema discovery is split from charting so that callers can learn valid
//! column names before spending a tabular query on them.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use super::chart::project_series;
use super::client::OpenDataApi;
use super::error::DataGouvError;
use super::models::{
    ChartPayload, ChartSource, DatasetSchema, ResourceSchema, SearchOutcome, TabularOutcome,
};

pub const DEFAULT_DATASET_PAGE_BASE: &str = "https://www.data.gouv.fr/fr/datasets";
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 5;
pub const DEFAULT_QUERY_LIMIT: u32 = 20;

/// Composes the upstream calls into the multi-step workflow exposed to tools.
pub struct DatasetExplorer {
    api: Arc<dyn OpenDataApi>,
    dataset_page_base: String,
    profile_concurrency: usize,
}

impl DatasetExplorer {
    /// # Arguments
    /// * `api` - Upstream access
    /// * `dataset_page_base` - Prefix of public dataset pages, used to derive `dataset_url`
    /// * `profile_concurrency` - Profile lookups in flight during schema discovery (1 = sequential)
    pub fn new(
        api: Arc<dyn OpenDataApi>,
        dataset_page_base: impl Into<String>,
        profile_concurrency: usize,
    ) -> Self {
        Self {
            api,
            dataset_page_base: dataset_page_base.into().trim_end_matches('/').to_string(),
            profile_concurrency: profile_concurrency.max(1),
        }
    }

    pub async fn search_datasets(
        &self,
        query: &str,
        page_size: u32,
    ) -> Result<SearchOutcome, DataGouvError> {
        self.api.search_datasets(query, page_size).await
    }

    pub async fn query_tabular_data(
        &self,
        resource_id: &str,
        limit: u32,
    ) -> Result<TabularOutcome, DataGouvError> {
        self.api.query_tabular_data(resource_id, limit).await
    }

    /// Public page of a dataset. Derived locally, never fetched.
    pub fn dataset_url(&self, dataset_id: &str) -> String {
        format!("{}/{}/", self.dataset_page_base, dataset_id)
    }

    /// Fetch rows of a dataset resource and project two columns into a bar chart.
    ///
    /// `columns` is read positionally as `[label_column, value_column]`; extra
    /// entries are ignored. When `resource_id` is `None`, the first csv or
    /// parquet resource of the dataset is used. A given `resource_id` is
    /// trusted as is.
    pub async fn query_dataset(
        &self,
        dataset_id: &str,
        columns: &[String],
        resource_id: Option<&str>,
        limit: u32,
    ) -> Result<ChartPayload, DataGouvError> {
        let (label_column, value_column) = match columns {
            [label, value, ..] if !label.is_empty() && !value.is_empty() => (label, value),
            _ => return Err(DataGouvError::InvalidColumns),
        };

        let dataset = self.api.get_dataset_resources(dataset_id).await?;

        let resolved_resource_id = match resource_id {
            Some(id) => id.to_string(),
            None => dataset
                .resources
                .iter()
                .find(|r| r.is_tabular())
                .map(|r| r.id.clone())
                .ok_or_else(|| DataGouvError::NoTabularResource(dataset_id.to_string()))?,
        };

        debug!(
            dataset_id,
            resource_id = %resolved_resource_id,
            limit,
            "Querying tabular resource"
        );
        let rows = self
            .api
            .query_tabular_data(&resolved_resource_id, limit)
            .await?;

        let chart = project_series(&rows.data, label_column, value_column);
        info!(
            dataset_id,
            resource_id = %resolved_resource_id,
            points = chart.labels.len(),
            "Chart payload built"
        );

        Ok(ChartPayload {
            title: dataset.title,
            dataset_url: self.dataset_url(dataset_id),
            chart,
            source: ChartSource {
                dataset_id: dataset_id.to_string(),
                resource_id: resolved_resource_id,
                last_modified: dataset.last_modified,
            },
        })
    }

    /// List the columns of every csv/parquet resource of a dataset.
    ///
    /// Other resources are left out. Profile failures only empty the
    /// `columns` of the affected resource.
    pub async fn get_dataset_schema(&self, dataset_id: &str) -> Result<DatasetSchema, DataGouvError> {
        let dataset = self.api.get_dataset_resources(dataset_id).await?;

        let tabular: Vec<_> = dataset
            .resources
            .into_iter()
            .filter(|r| r.is_tabular())
            .collect();

        let ids: Vec<String> = tabular.iter().map(|r| r.id.clone()).collect();
        let api = self.api.clone();
        // `buffered` yields in input order whatever the completion order.
        let profiles: Vec<Vec<String>> = stream::iter(ids)
            .map(move |id| {
                let api = api.clone();
                async move { api.get_resource_profile(&id).await }
            })
            .buffered(self.profile_concurrency)
            .collect()
            .await;

        let resources = tabular
            .into_iter()
            .zip(profiles)
            .map(|(resource, columns)| ResourceSchema {
                id: resource.id,
                title: resource.title,
                format: resource.format,
                columns,
            })
            .collect();

        Ok(DatasetSchema {
            dataset_id: dataset_id.to_string(),
            title: dataset.title,
            resources,
        })
    }
}
