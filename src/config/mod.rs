mod file_config;

pub use file_config::{DataGouvFileConfig, FileConfig};

use crate::datagouv::client::{DEFAULT_API_BASE, DEFAULT_TABULAR_API_BASE};
use crate::datagouv::explorer::DEFAULT_DATASET_PAGE_BASE;
use crate::datagouv::ApiEndpoints;
use crate::server::config::{DEFAULT_BIND_ADDRESS, DEFAULT_PORT};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_PROFILE_CONCURRENCY: usize = 1;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub assets_dir: Option<PathBuf>,
    pub datagouv_api_base: String,
    pub tabular_api_base: String,
    pub dataset_page_base: String,
    pub http_timeout_sec: u64,
    pub profile_concurrency: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            logging_level: RequestsLoggingLevel::default(),
            assets_dir: None,
            datagouv_api_base: DEFAULT_API_BASE.to_string(),
            tabular_api_base: DEFAULT_TABULAR_API_BASE.to_string(),
            dataset_page_base: DEFAULT_DATASET_PAGE_BASE.to_string(),
            http_timeout_sec: DEFAULT_HTTP_TIMEOUT_SEC,
            profile_concurrency: DEFAULT_PROFILE_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub assets_dir: Option<PathBuf>,
    pub datagouv: DataGouvSettings,
}

/// Resolved upstream settings.
#[derive(Debug, Clone)]
pub struct DataGouvSettings {
    pub endpoints: ApiEndpoints,
    pub dataset_page_base: String,
    pub http_timeout: Duration,
    pub profile_concurrency: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = match file.logging_level {
            Some(s) => parse_logging_level(&s)
                .with_context(|| format!("Invalid logging_level in config file: {}", s))?,
            None => cli.logging_level.clone(),
        };

        let assets_dir = file
            .assets_dir
            .map(PathBuf::from)
            .or_else(|| cli.assets_dir.clone());
        if let Some(dir) = &assets_dir {
            if !dir.exists() {
                bail!("Assets directory does not exist: {:?}", dir);
            }
            if !dir.is_dir() {
                bail!("assets_dir is not a directory: {:?}", dir);
            }
        }

        let dg_file = file.datagouv.unwrap_or_default();

        let api_base = dg_file
            .api_base
            .unwrap_or_else(|| cli.datagouv_api_base.clone());
        let tabular_api_base = dg_file
            .tabular_api_base
            .unwrap_or_else(|| cli.tabular_api_base.clone());
        let dataset_page_base = dg_file
            .dataset_page_base
            .unwrap_or_else(|| cli.dataset_page_base.clone());
        validate_base_url("api_base", &api_base)?;
        validate_base_url("tabular_api_base", &tabular_api_base)?;
        validate_base_url("dataset_page_base", &dataset_page_base)?;

        let http_timeout_sec = dg_file.http_timeout_sec.unwrap_or(cli.http_timeout_sec);
        if http_timeout_sec == 0 {
            bail!("http_timeout_sec must be at least 1");
        }

        let profile_concurrency = dg_file
            .profile_concurrency
            .unwrap_or(cli.profile_concurrency);
        if profile_concurrency == 0 {
            bail!("profile_concurrency must be at least 1");
        }

        Ok(Self {
            port,
            bind_address,
            logging_level,
            assets_dir,
            datagouv: DataGouvSettings {
                endpoints: ApiEndpoints {
                    api_base,
                    tabular_api_base,
                },
                dataset_page_base,
                http_timeout: Duration::from_secs(http_timeout_sec),
                profile_concurrency,
            },
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            bind_address: self.bind_address.clone(),
            assets_dir: self.assets_dir.clone(),
        }
    }
}

fn validate_base_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("Invalid {}: {}", name, value))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{} must be an http(s) URL, got {}", name, value);
    }
    Ok(())
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
