//! Fake data.gouv.fr upstream
//!
//! Serves canned metadata, tabular and profile responses on a random local
//! port and records every request it receives, so tests can assert both on
//! results and on which upstream calls were (or were not) issued.

use super::constants::*;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use datagouv_mcp_server::{ApiEndpoints, DataGouvClient, DatasetExplorer};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Page prefix handed to explorers built by the tests
pub const DATASET_PAGE_BASE: &str = "https://www.data.gouv.fr/fr/datasets";

type Canned = (StatusCode, String);
type RequestLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct Fixture {
    search: Option<Canned>,
    datasets: HashMap<String, Canned>,
    tabular: HashMap<String, Canned>,
    profiles: HashMap<String, Canned>,
}

fn ok(body: serde_json::Value) -> Canned {
    (StatusCode::OK, body.to_string())
}

fn canned_fixture() -> Fixture {
    let mut fixture = Fixture {
        search: Some(ok(json!({
            "data": [
                {
                    "id": POPULATION_DATASET_ID,
                    "title": "Population par région",
                    "description": "é".repeat(300),
                    "organization": {"name": "INSEE"},
                    "page": format!("{}/{}/", DATASET_PAGE_BASE, POPULATION_DATASET_ID),
                    "last_modified": "2024-01-15T10:00:00",
                    "resources": [{}, {}, {}]
                },
                {
                    "id": "dataset-orphan",
                    "title": "Jeu sans organisation"
                }
            ],
            // Lower than the number of returned datasets on purpose
            "total": 1
        }))),
        ..Default::default()
    };

    let datasets = [
        (
            POPULATION_DATASET_ID,
            ok(json!({
                "id": POPULATION_DATASET_ID,
                "title": "Population par région",
                "last_modified": "2024-01-15T10:00:00",
                "resources": [
                    {"id": POPULATION_RESOURCE_ID, "title": "population.csv", "format": "CSV",
                     "url": "https://static.data.gouv.fr/r1.csv"}
                ]
            })),
        ),
        (
            MIXED_DATASET_ID,
            ok(json!({
                "id": MIXED_DATASET_ID,
                "title": "Jeu mixte",
                "last_modified": "2023-06-01",
                "resources": [
                    {"id": "doc-pdf", "title": "Notice", "format": "PDF"},
                    {"id": PARQUET_RESOURCE_ID, "title": "export", "format": "PARQUET"},
                    {"id": FAILING_PROFILE_RESOURCE_ID, "format": "csv"},
                    {"id": "r-json", "title": "api", "format": "JSON"},
                    {"id": GARBAGE_PROFILE_RESOURCE_ID, "title": "brut", "format": "csv"}
                ]
            })),
        ),
        (
            DOCS_DATASET_ID,
            ok(json!({
                "id": DOCS_DATASET_ID,
                "title": "Documentation",
                "resources": [{"id": "doc", "title": "guide", "format": "pdf"}]
            })),
        ),
        (
            SPARSE_DATASET_ID,
            ok(json!({
                "id": SPARSE_DATASET_ID,
                "title": "Régions incomplètes",
                "last_modified": "2022-03-03",
                "resources": [{"id": SPARSE_RESOURCE_ID, "format": "csv"}]
            })),
        ),
        (
            BROKEN_DATASET_ID,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "boom"}).to_string(),
            ),
        ),
    ];
    fixture
        .datasets
        .extend(datasets.map(|(id, canned)| (id.to_string(), canned)));

    let tabular = [
        (
            POPULATION_RESOURCE_ID,
            ok(json!({
                "data": [
                    {"region": "Nord", "pop": "120"},
                    {"region": "Sud", "pop": "80"}
                ],
                "meta": {"total": 2, "page": 1, "page_size": 20}
            })),
        ),
        (
            PARQUET_RESOURCE_ID,
            ok(json!({
                "data": [
                    {"annee": 2022, "total": 10.5},
                    {"annee": 2023, "total": null}
                ],
                "meta": {"total": 2, "page": 1, "page_size": 20}
            })),
        ),
        (
            SPARSE_RESOURCE_ID,
            ok(json!({
                "data": [
                    {"region": "Est"},
                    {"region": "Ouest", "pop": "50"}
                ],
                "meta": {"total": 2, "page": 1, "page_size": 20}
            })),
        ),
        (
            PARTIAL_RESOURCE_ID,
            ok(json!({"data": [{"x": 1}]})),
        ),
        (
            FAILING_TABULAR_RESOURCE_ID,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "tabular backend down"}).to_string(),
            ),
        ),
    ];
    fixture
        .tabular
        .extend(tabular.map(|(id, canned)| (id.to_string(), canned)));

    let profiles = [
        (POPULATION_RESOURCE_ID, ok(json!({"columns": ["a", "b"]}))),
        (
            PARQUET_RESOURCE_ID,
            ok(json!({"profile": [{"name": "annee"}, {"name": ""}, {"name": "total"}]})),
        ),
        (
            FAILING_PROFILE_RESOURCE_ID,
            (StatusCode::INTERNAL_SERVER_ERROR, "{}".to_string()),
        ),
        (
            GARBAGE_PROFILE_RESOURCE_ID,
            (StatusCode::OK, "definitely not json".to_string()),
        ),
    ];
    fixture
        .profiles
        .extend(profiles.map(|(id, canned)| (id.to_string(), canned)));

    fixture
}

fn reply(canned: Option<&Canned>) -> Response {
    match canned {
        Some((status, body)) => (
            *status,
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            json!({"message": "Not found"}).to_string(),
        )
            .into_response(),
    }
}

async fn search(
    State(fixture): State<Arc<Fixture>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.get("q").map(String::as_str) == Some(FAILING_SEARCH_QUERY) {
        return reply(Some(&(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"message": "search unavailable"}).to_string(),
        )));
    }
    reply(fixture.search.as_ref())
}

async fn dataset(State(fixture): State<Arc<Fixture>>, Path(id): Path<String>) -> Response {
    reply(fixture.datasets.get(&id))
}

async fn tabular_data(State(fixture): State<Arc<Fixture>>, Path(id): Path<String>) -> Response {
    reply(fixture.tabular.get(&id))
}

async fn profile(State(fixture): State<Arc<Fixture>>, Path(id): Path<String>) -> Response {
    reply(fixture.profiles.get(&id))
}

async fn record(State(log): State<RequestLog>, request: Request<Body>, next: Next) -> Response {
    log.lock().unwrap().push(request.uri().to_string());
    next.run(request).await
}

/// Running fake upstream. Shuts down when dropped.
pub struct FakeUpstream {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    requests: RequestLog,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeUpstream {
    pub async fn spawn() -> Self {
        let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route("/api/1/datasets/", get(search))
            .route("/api/1/datasets/{id}/", get(dataset))
            .route("/tabular/{id}/data/", get(tabular_data))
            .route("/tabular/{id}/profile/", get(profile))
            .with_state(Arc::new(canned_fixture()))
            .layer(middleware::from_fn_with_state(requests.clone(), record));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints {
            api_base: format!("{}/api/1", self.base_url),
            tabular_api_base: format!("{}/tabular", self.base_url),
        }
    }

    pub fn client(&self) -> DataGouvClient {
        DataGouvClient::new(self.endpoints(), Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .expect("Failed to build client")
    }

    pub fn explorer(&self, profile_concurrency: usize) -> DatasetExplorer {
        DatasetExplorer::new(
            Arc::new(self.client()),
            DATASET_PAGE_BASE,
            profile_concurrency,
        )
    }

    /// Every request received so far, as path plus query string
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
