use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub logging_level: Option<String>,
    pub assets_dir: Option<String>,

    pub datagouv: Option<DataGouvFileConfig>,
}

/// The `[datagouv]` table: upstream endpoints and client tuning.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DataGouvFileConfig {
    pub api_base: Option<String>,
    pub tabular_api_base: Option<String>,
    pub dataset_page_base: Option<String>,
    pub http_timeout_sec: Option<u64>,
    pub profile_concurrency: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
