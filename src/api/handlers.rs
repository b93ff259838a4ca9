use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::analytics::{
    aggregate_emissions_by_department, calculate_emissions_trend, total_emissions,
    DepartmentMapping,
};
use crate::client::{ClientError, EmissionsSource, FallbackClient, RemoteClient};
use crate::config::UpstreamConfig;
use crate::models::{SummaryPeriod, TrendPeriod, UnknownPeriod};

const PROJECTS_DEMO_MESSAGE: &str = "Using demo data - configure CODECARBON_API_KEY for real data";
const PROJECTS_LIVE_MESSAGE: &str = "Live data from Code Carbon API";
const EMISSIONS_DEMO_MESSAGE: &str = "Demo data - configure CODECARBON_API_KEY for real tracking";
const EMISSIONS_LIVE_MESSAGE: &str = "Live emissions data";
const SUMMARY_DEMO_MESSAGE: &str = "Demo summary data";
const SUMMARY_LIVE_MESSAGE: &str = "Live summary from Code Carbon";

pub struct AppState {
    /// Connection pool shared by the per-request clients
    pub http: reqwest::Client,
    pub upstream: UpstreamConfig,
    pub department_mapping: DepartmentMapping,
}

impl AppState {
    pub fn new(upstream: UpstreamConfig, department_mapping: DepartmentMapping) -> anyhow::Result<Self> {
        let http = RemoteClient::build_http_client(std::time::Duration::from_secs(
            upstream.timeout_secs,
        ))?;

        // Surface a bad base URL at startup instead of on every request
        RemoteClient::new(http.clone(), &upstream.base_url, "")?;

        Ok(Self {
            http,
            upstream,
            department_mapping,
        })
    }

    /// A fresh client per request, so a downgrade only affects that request
    fn client(&self) -> Result<FallbackClient, ApiError> {
        FallbackClient::connect(self.http.clone(), &self.upstream)
            .map_err(|e| ApiError::Upstream(e.to_string()))
    }
}

/// Envelope for every data response, disclosing where the data came from
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse<T> {
    pub data: T,
    pub is_mock_data: bool,
    pub message: String,
}

impl<T> DataResponse<T> {
    fn new(data: T, is_mock_data: bool, demo_message: &str, live_message: &str) -> Self {
        let message = if is_mock_data { demo_message } else { live_message };
        Self {
            data,
            is_mock_data,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable reason
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Project ID is required")]
    MissingProjectId,
    #[error("{0}")]
    InvalidQuery(String),
    #[error(transparent)]
    InvalidPeriod(#[from] UnknownPeriod),
    #[error("{0}")]
    Upstream(String),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self {
            ApiError::MissingProjectId => (StatusCode::BAD_REQUEST, "missing_project_id"),
            ApiError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "invalid_query"),
            ApiError::InvalidPeriod(_) => (StatusCode::BAD_REQUEST, "invalid_period"),
            ApiError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "upstream_failure"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: reason.to_string(),
                details: Some(self.to_string()),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsQuery {
    pub project_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    /// `department`, `trend` or `totals`; anything else lists records
    pub aggregate: Option<String>,
    /// Trend bucket width, `day` when absent
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub project_id: Option<String>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn require_project_id(project_id: Option<&str>) -> Result<&str, ApiError> {
    project_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingProjectId)
}

enum Aggregation {
    Records,
    Department,
    Trend(TrendPeriod),
    Totals,
}

impl Aggregation {
    fn from_query(query: &EmissionsQuery) -> Result<Self, ApiError> {
        Ok(match query.aggregate.as_deref() {
            Some("department") => Aggregation::Department,
            Some("trend") => Aggregation::Trend(match query.period.as_deref() {
                Some(period) => period.parse()?,
                None => TrendPeriod::default(),
            }),
            Some("totals") => Aggregation::Totals,
            _ => Aggregation::Records,
        })
    }
}

/// List the projects visible to the configured credential
pub async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let api = state.client()?;
    let projects = api.list_projects().await?;

    Ok(Json(DataResponse::new(
        projects,
        api.is_mock_mode(),
        PROJECTS_DEMO_MESSAGE,
        PROJECTS_LIVE_MESSAGE,
    ))
    .into_response())
}

/// List a project's emissions, optionally aggregated
pub async fn list_emissions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmissionsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    // Reject bad input before touching the network
    let Query(query) = query?;
    let project_id = require_project_id(query.project_id.as_deref())?;
    let aggregation = Aggregation::from_query(&query)?;

    let api = state.client()?;
    let records = api
        .get_project_emissions(
            project_id,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.limit,
        )
        .await?;
    let is_mock = api.is_mock_mode();

    tracing::debug!(
        project_id,
        records = records.len(),
        is_mock,
        "fetched emissions"
    );

    let response = match aggregation {
        Aggregation::Records => Json(DataResponse::new(
            records,
            is_mock,
            EMISSIONS_DEMO_MESSAGE,
            EMISSIONS_LIVE_MESSAGE,
        ))
        .into_response(),
        Aggregation::Department => Json(DataResponse::new(
            aggregate_emissions_by_department(&records, &state.department_mapping),
            is_mock,
            EMISSIONS_DEMO_MESSAGE,
            EMISSIONS_LIVE_MESSAGE,
        ))
        .into_response(),
        Aggregation::Trend(period) => Json(DataResponse::new(
            calculate_emissions_trend(&records, period),
            is_mock,
            EMISSIONS_DEMO_MESSAGE,
            EMISSIONS_LIVE_MESSAGE,
        ))
        .into_response(),
        Aggregation::Totals => Json(DataResponse::new(
            total_emissions(&records),
            is_mock,
            EMISSIONS_DEMO_MESSAGE,
            EMISSIONS_LIVE_MESSAGE,
        ))
        .into_response(),
    };

    Ok(response)
}

/// Server-side emission summary for a project
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let project_id = require_project_id(query.project_id.as_deref())?;
    let period = match query.period.as_deref() {
        Some(period) => period.parse::<SummaryPeriod>()?,
        None => SummaryPeriod::default(),
    };

    let api = state.client()?;
    let summary = api
        .get_emissions_summary(
            project_id,
            period,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;

    Ok(Json(DataResponse::new(
        summary,
        api.is_mock_mode(),
        SUMMARY_DEMO_MESSAGE,
        SUMMARY_LIVE_MESSAGE,
    ))
    .into_response())
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
