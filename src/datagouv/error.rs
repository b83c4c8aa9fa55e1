//! Error taxonomy for the data.gouv.fr access layer.

use thiserror::Error;

/// Errors raised while talking to the data.gouv.fr and tabular APIs.
///
/// Everything except [`DataGouvError::InvalidColumns`] originates from an
/// upstream call. The orchestrator propagates these unchanged; only the
/// column profile lookup swallows them.
#[derive(Debug, Error)]
pub enum DataGouvError {
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Remote API error (status {status}) for {url}")]
    RemoteApi { status: u16, url: String },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Resource not available in the tabular API: {0}")]
    ResourceNotTabular(String),

    #[error("No CSV/Parquet resource found for dataset: {0}")]
    NoTabularResource(String),

    #[error("Two columns required: [label_column, value_column]")]
    InvalidColumns,
}

impl DataGouvError {
    /// HTTP status carried by the error, if it came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            DataGouvError::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}
