use std::path::PathBuf;

use super::RequestsLoggingLevel;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub bind_address: String,
    /// Directory served under `/assets` (chart UI bundle), if any.
    pub assets_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            assets_dir: None,
        }
    }
}
