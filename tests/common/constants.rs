//! Shared constants for end-to-end tests
//!
//! Ids of the canned datasets and resources served by the fake upstream.
//! When the canned data changes, update this file and `upstream.rs` together.

// ============================================================================
// Search
// ============================================================================

/// Search answers 500 for this query
pub const FAILING_SEARCH_QUERY: &str = "panne";

// ============================================================================
// Canned datasets
// ============================================================================

/// One CSV resource with two clean rows
pub const POPULATION_DATASET_ID: &str = "5c34944e8b4c4109c1d94b3a";

/// Mixed formats: pdf, parquet, csv, json, csv (in that order)
pub const MIXED_DATASET_ID: &str = "dataset-mixed";

/// Only non-tabular resources
pub const DOCS_DATASET_ID: &str = "dataset-docs";

/// One CSV resource whose first row lacks the value column
pub const SPARSE_DATASET_ID: &str = "dataset-sparse";

/// Dataset lookup answers 500
pub const BROKEN_DATASET_ID: &str = "dataset-broken";

// ============================================================================
// Canned resources
// ============================================================================

/// CSV resource of the population dataset. Its profile lists bare column names.
pub const POPULATION_RESOURCE_ID: &str = "r1";

/// First tabular resource of the mixed dataset, profile with descriptors
pub const PARQUET_RESOURCE_ID: &str = "r-parquet";

/// Profile endpoint answers 500
pub const FAILING_PROFILE_RESOURCE_ID: &str = "r-csv";

/// Profile endpoint answers 200 with a body that is not JSON
pub const GARBAGE_PROFILE_RESOURCE_ID: &str = "r-garbage";

pub const SPARSE_RESOURCE_ID: &str = "r-sparse";

/// Tabular answer without `meta`
pub const PARTIAL_RESOURCE_ID: &str = "r-partial";

/// Tabular endpoint answers 500
pub const FAILING_TABULAR_RESOURCE_ID: &str = "r-error";

/// Unknown to the tabular API (404)
pub const MISSING_RESOURCE_ID: &str = "rX";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
