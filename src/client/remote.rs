use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client, Url,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::trait_def::{ClientError, ClientResult, EmissionsSource};
use crate::models::{EmissionRecord, Project, Run, SummaryBucket, SummaryPeriod};

pub const DEFAULT_BASE_URL: &str = "https://api.codecarbon.io";

/// Authenticated HTTP client for the emissions tracking service
///
/// Makes exactly one GET per operation. Any non-2xx status becomes
/// [`ClientError::RemoteService`]; the body of a failed response is ignored.
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl RemoteClient {
    pub fn new(http: Client, base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid emissions service base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("emissions service base URL '{base_url}' cannot carry a path");
        }

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Build the shared connection pool used by every client instance
    pub fn build_http_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .user_agent(concat!("carbonboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the emissions service")
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    fn emissions_url(
        &self,
        project_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<u32>,
    ) -> Url {
        let mut query = Vec::new();
        if let Some(start) = start_date {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.endpoint(&["projects", project_id, "emissions"], &query)
    }

    fn latest_url(&self, project_id: &str, limit: u32) -> Url {
        self.endpoint(
            &["projects", project_id, "emissions"],
            &[("limit", limit.to_string()), ("order", "desc".to_string())],
        )
    }

    fn summary_url(
        &self,
        project_id: &str,
        period: SummaryPeriod,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Url {
        let mut query = vec![("period", period.as_str().to_string())];
        if let Some(start) = start_date {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end.to_string()));
        }
        self.endpoint(&["projects", project_id, "emissions", "summary"], &query)
    }

    async fn request<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        debug!(%url, "requesting emissions service");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RemoteService {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl EmissionsSource for RemoteClient {
    async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        self.request(self.endpoint(&["projects"], &[])).await
    }

    async fn get_project(&self, project_id: &str) -> ClientResult<Project> {
        self.request(self.endpoint(&["projects", project_id], &[]))
            .await
    }

    async fn get_project_emissions(
        &self,
        project_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<u32>,
    ) -> ClientResult<Vec<EmissionRecord>> {
        self.request(self.emissions_url(project_id, start_date, end_date, limit))
            .await
    }

    async fn get_runs(&self, project_id: &str) -> ClientResult<Vec<Run>> {
        self.request(self.endpoint(&["projects", project_id, "runs"], &[]))
            .await
    }

    async fn get_latest_emissions(
        &self,
        project_id: &str,
        limit: u32,
    ) -> ClientResult<Vec<EmissionRecord>> {
        self.request(self.latest_url(project_id, limit)).await
    }

    async fn get_emissions_summary(
        &self,
        project_id: &str,
        period: SummaryPeriod,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ClientResult<Vec<SummaryBucket>> {
        self.request(self.summary_url(project_id, period, start_date, end_date))
            .await
    }
}
