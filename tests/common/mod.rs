//! Stub emissions service for integration tests

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use carbonboard::client::mock::{generate_mock_emissions, generate_mock_runs, mock_project};
use carbonboard::models::{Project, SummaryBucket};
use std::sync::{Arc, Mutex};

/// What the stub saw for one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone, Default)]
pub struct Upstream {
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl Upstream {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap, uri: &Uri) {
        let text = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.seen.lock().unwrap().push(SeenRequest {
            uri: uri.to_string(),
            authorization: text(header::AUTHORIZATION),
            content_type: text(header::CONTENT_TYPE),
        });
    }
}

pub fn live_project(id: &str) -> Project {
    Project {
        id: id.to_string(),
        name: format!("Live {id}"),
        ..mock_project(id)
    }
}

async fn projects(State(up): State<Upstream>, headers: HeaderMap, uri: Uri) -> Json<Vec<Project>> {
    up.record(&headers, &uri);
    Json(vec![live_project("live-1"), live_project("live-2")])
}

async fn project(
    State(up): State<Upstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> Json<Project> {
    up.record(&headers, &uri);
    Json(live_project(&id))
}

async fn emissions(
    State(up): State<Upstream>,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    up.record(&headers, &uri);
    Json(generate_mock_emissions(3))
}

async fn runs(
    State(up): State<Upstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    up.record(&headers, &uri);
    Json(generate_mock_runs(&id))
}

async fn summary(State(up): State<Upstream>, headers: HeaderMap, uri: Uri) -> impl IntoResponse {
    up.record(&headers, &uri);
    Json(vec![SummaryBucket {
        period: "2024-01-01".to_string(),
        total_emissions: 1.5,
        total_energy: 4.0,
        avg_emissions_rate: 0.2,
        count: 9,
    }])
}

/// A healthy service answering every endpoint
pub fn healthy_router(up: Upstream) -> Router {
    Router::new()
        .route("/projects", get(projects))
        .route("/projects/{id}", get(project))
        .route("/projects/{id}/emissions", get(emissions))
        .route("/projects/{id}/runs", get(runs))
        .route("/projects/{id}/emissions/summary", get(summary))
        .with_state(up)
}

/// A service that answers every request with 503
pub fn failing_router(up: Upstream) -> Router {
    Router::new()
        .fallback(|State(up): State<Upstream>, headers: HeaderMap, uri: Uri| async move {
            up.record(&headers, &uri);
            (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
        })
        .with_state(up)
}

/// A service that answers 200 with a body of the wrong shape
pub fn malformed_router(up: Upstream) -> Router {
    Router::new()
        .fallback(|State(up): State<Upstream>, headers: HeaderMap, uri: Uri| async move {
            up.record(&headers, &uri);
            Json(serde_json::json!({ "unexpected": true }))
        })
        .with_state(up)
}

/// Serve `router` on an ephemeral port and return its base URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
