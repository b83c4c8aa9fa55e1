//! Access layer for French public open data (data.gouv.fr).
//!
//! Turns the dataset search, dataset metadata, tabular row and column
//! profile APIs into one workflow: search, schema discovery, tabular query,
//! chart-ready payload.

pub mod chart;
pub mod client;
pub mod error;
pub mod explorer;
pub mod http;
pub mod models;

pub use client::{ApiEndpoints, DataGouvClient, OpenDataApi};
pub use error::DataGouvError;
pub use explorer::DatasetExplorer;
pub use models::{
    ChartPayload, DatasetInfo, DatasetSchema, DatasetSummary, Resource, ResourceSchema,
    SearchOutcome, TabularOutcome, TabularRow,
};
