use crate::models::{EmissionRecord, Project, Run, SummaryBucket, SummaryPeriod};
use async_trait::async_trait;
use thiserror::Error;

/// Default page size for [`EmissionsSource::get_latest_emissions`]
pub const DEFAULT_LATEST_LIMIT: u32 = 100;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status
    #[error("emissions service error: {status} {status_text}")]
    RemoteService { status: u16, status_text: String },
    #[error("failed to reach emissions service: {0}")]
    Transport(#[from] reqwest::Error),
    /// A 2xx response whose body did not match the expected shape
    #[error("malformed emissions service response: {0}")]
    Deserialization(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Read access to projects and their emission data
///
/// Implemented by the live HTTP client and by the fallback wrapper that
/// substitutes synthetic data, so callers never care where records came from.
#[async_trait]
pub trait EmissionsSource: Send + Sync {
    /// List every project visible to the credential
    async fn list_projects(&self) -> ClientResult<Vec<Project>>;

    async fn get_project(&self, project_id: &str) -> ClientResult<Project>;

    /// Emission records of a project, optionally bounded by date and count
    async fn get_project_emissions(
        &self,
        project_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<u32>,
    ) -> ClientResult<Vec<EmissionRecord>>;

    async fn get_runs(&self, project_id: &str) -> ClientResult<Vec<Run>>;

    /// Most recent records first
    async fn get_latest_emissions(
        &self,
        project_id: &str,
        limit: u32,
    ) -> ClientResult<Vec<EmissionRecord>>;

    /// Server-side aggregation of a project's emissions per period
    async fn get_emissions_summary(
        &self,
        project_id: &str,
        period: SummaryPeriod,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ClientResult<Vec<SummaryBucket>>;
}
