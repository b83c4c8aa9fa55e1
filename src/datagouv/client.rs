//! HTTP client for the data.gouv.fr metadata API and the tabular API.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::DataGouvError;
use super::http::{build_url, HttpJsonClient};
use super::models::{
    profile_columns, DatasetInfo, RawDatasetDetail, RawSearchPage, RawTabularPage, SearchOutcome,
    TabularOutcome,
};

pub const DEFAULT_API_BASE: &str = "https://www.data.gouv.fr/api/1";
pub const DEFAULT_TABULAR_API_BASE: &str = "https://tabular-api.data.gouv.fr/api/resources";

/// Base URLs of the two upstream services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Search and dataset metadata, e.g. `https://www.data.gouv.fr/api/1`.
    pub api_base: String,
    /// Row queries and profiles, e.g. `https://tabular-api.data.gouv.fr/api/resources`.
    pub tabular_api_base: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            tabular_api_base: DEFAULT_TABULAR_API_BASE.to_string(),
        }
    }
}

/// Read-only access to the open data APIs.
///
/// Every method is a single stateless request. Only
/// [`OpenDataApi::get_resource_profile`] is infallible: column discovery is
/// best effort and must never abort a caller's workflow.
#[async_trait]
pub trait OpenDataApi: Send + Sync {
    /// Free-text dataset search, one page of `page_size` results.
    async fn search_datasets(
        &self,
        query: &str,
        page_size: u32,
    ) -> Result<SearchOutcome, DataGouvError>;

    /// Metadata and resource list of one dataset.
    async fn get_dataset_resources(&self, dataset_id: &str) -> Result<DatasetInfo, DataGouvError>;

    /// First page of rows of a tabular resource.
    async fn query_tabular_data(
        &self,
        resource_id: &str,
        limit: u32,
    ) -> Result<TabularOutcome, DataGouvError>;

    /// Column names of a tabular resource, empty on any failure.
    async fn get_resource_profile(&self, resource_id: &str) -> Vec<String>;
}

pub struct DataGouvClient {
    http: HttpJsonClient,
    endpoints: ApiEndpoints,
}

impl DataGouvClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `endpoints` - Base URLs of the metadata and tabular APIs
    /// * `timeout` - Upper bound for each individual request
    pub fn new(endpoints: ApiEndpoints, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            http: HttpJsonClient::new(timeout)?,
            endpoints: ApiEndpoints {
                api_base: endpoints.api_base.trim_end_matches('/').to_string(),
                tabular_api_base: endpoints.tabular_api_base.trim_end_matches('/').to_string(),
            },
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl OpenDataApi for DataGouvClient {
    async fn search_datasets(
        &self,
        query: &str,
        page_size: u32,
    ) -> Result<SearchOutcome, DataGouvError> {
        let url = build_url(
            &self.endpoints.api_base,
            &["datasets"],
            &[("q", query.to_string()), ("page_size", page_size.to_string())],
        )?;

        let raw: RawSearchPage = self.http.get_json(&url).await?;
        let outcome = SearchOutcome::from_raw(raw, query);

        debug!(
            query,
            returned = outcome.datasets.len(),
            total = outcome.total,
            "Dataset search completed"
        );
        Ok(outcome)
    }

    async fn get_dataset_resources(&self, dataset_id: &str) -> Result<DatasetInfo, DataGouvError> {
        let url = build_url(&self.endpoints.api_base, &["datasets", dataset_id], &[])?;

        let raw: RawDatasetDetail = match self.http.get_json(&url).await {
            Ok(raw) => raw,
            Err(DataGouvError::RemoteApi { .. }) => {
                return Err(DataGouvError::DatasetNotFound(dataset_id.to_string()))
            }
            Err(e) => return Err(e),
        };

        Ok(DatasetInfo::from_raw(raw))
    }

    async fn query_tabular_data(
        &self,
        resource_id: &str,
        limit: u32,
    ) -> Result<TabularOutcome, DataGouvError> {
        let url = build_url(
            &self.endpoints.tabular_api_base,
            &[resource_id, "data"],
            &[("page_size", limit.to_string())],
        )?;

        let raw: RawTabularPage = match self.http.get_json(&url).await {
            Ok(raw) => raw,
            Err(DataGouvError::RemoteApi { status: 404, .. }) => {
                return Err(DataGouvError::ResourceNotTabular(resource_id.to_string()))
            }
            Err(e) => return Err(e),
        };

        Ok(TabularOutcome::from_raw(raw, limit))
    }

    async fn get_resource_profile(&self, resource_id: &str) -> Vec<String> {
        let url = match build_url(
            &self.endpoints.tabular_api_base,
            &[resource_id, "profile"],
            &[],
        ) {
            Ok(url) => url,
            Err(e) => {
                warn!(resource_id, error = %e, "Cannot build profile URL");
                return Vec::new();
            }
        };

        match self.http.get_json::<Value>(&url).await {
            Ok(body) => profile_columns(&body),
            Err(e) => {
                warn!(resource_id, error = %e, "Column profile unavailable");
                Vec::new()
            }
        }
    }
}
