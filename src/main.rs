use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use datagouv_mcp_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_HTTP_TIMEOUT_SEC, DEFAULT_PROFILE_CONCURRENCY,
};
use datagouv_mcp_server::datagouv::client::{DEFAULT_API_BASE, DEFAULT_TABULAR_API_BASE};
use datagouv_mcp_server::datagouv::explorer::DEFAULT_DATASET_PAGE_BASE;
use datagouv_mcp_server::{
    run_server, DataGouvClient, DatasetExplorer, RequestsLoggingLevel, SERVER_VERSION,
};

#[derive(Parser, Debug)]
#[clap(version = SERVER_VERSION)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Directory served under /assets (chart widget bundles).
    #[clap(long)]
    pub assets_dir: Option<PathBuf>,

    /// Base URL of the data.gouv.fr metadata API.
    #[clap(long, default_value = DEFAULT_API_BASE)]
    pub datagouv_api_base: String,

    /// Base URL of the tabular API.
    #[clap(long, default_value = DEFAULT_TABULAR_API_BASE)]
    pub tabular_api_base: String,

    /// Prefix of the public dataset pages.
    #[clap(long, default_value = DEFAULT_DATASET_PAGE_BASE)]
    pub dataset_page_base: String,

    /// Timeout in seconds for each upstream request.
    #[clap(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SEC)]
    pub http_timeout_sec: u64,

    /// Column profile lookups in flight during schema discovery.
    #[clap(long, default_value_t = DEFAULT_PROFILE_CONCURRENCY)]
    pub profile_concurrency: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            bind_address: self.bind_address.clone(),
            logging_level: self.logging_level.clone(),
            assets_dir: self.assets_dir.clone(),
            datagouv_api_base: self.datagouv_api_base.clone(),
            tabular_api_base: self.tabular_api_base.clone(),
            dataset_page_base: self.dataset_page_base.clone(),
            http_timeout_sec: self.http_timeout_sec,
            profile_concurrency: self.profile_concurrency,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!(
        "Using data.gouv.fr API at {} and tabular API at {}",
        app_config.datagouv.endpoints.api_base, app_config.datagouv.endpoints.tabular_api_base
    );
    let client = DataGouvClient::new(
        app_config.datagouv.endpoints.clone(),
        app_config.datagouv.http_timeout,
    )
    .context("Failed to build HTTP client")?;

    let explorer = Arc::new(DatasetExplorer::new(
        Arc::new(client),
        app_config.datagouv.dataset_page_base.clone(),
        app_config.datagouv.profile_concurrency,
    ));

    run_server(app_config.server_config(), explorer).await
}
