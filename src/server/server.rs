use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::State,
    http::{header, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{log_requests, state::*, ServerConfig};
use crate::datagouv::DatasetExplorer;
use crate::mcp::{create_mcp_state, mcp_handler};
use crate::SERVER_VERSION;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(stats)
}

impl ServerState {
    fn new(config: ServerConfig, explorer: Arc<DatasetExplorer>) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_owned(),
            mcp_state: Arc::new(create_mcp_state(explorer)),
        }
    }
}

pub fn make_app(config: ServerConfig, explorer: Arc<DatasetExplorer>) -> Router {
    let state = ServerState::new(config.clone(), explorer);

    let mut app: Router = Router::new()
        .route("/", get(home))
        .route("/mcp", post(mcp_handler))
        .with_state(state.clone());

    if let Some(assets_dir) = config.assets_dir {
        let assets_routes = Router::new()
            .nest_service("/assets", ServeDir::new(assets_dir))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE]),
            );
        app = app.merge(assets_routes);
    }

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down");
    }
}

pub async fn run_server(config: ServerConfig, explorer: Arc<DatasetExplorer>) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, explorer);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(
        "datagouv MCP server {} listening on http://{}/mcp",
        SERVER_VERSION, address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
