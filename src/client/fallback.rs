use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::client::mock;
use crate::client::remote::RemoteClient;
use crate::client::trait_def::{ClientError, ClientResult, EmissionsSource};
use crate::config::UpstreamConfig;
use crate::models::{EmissionRecord, Project, Run, SummaryBucket, SummaryPeriod};

/// Credential value that means "no credential configured"
pub const DEMO_API_KEY: &str = "demo";

const PROJECTS_LATENCY: Duration = Duration::from_millis(500);
const EMISSIONS_LATENCY: Duration = Duration::from_millis(300);
const SUMMARY_LATENCY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy)]
pub struct FallbackOptions {
    /// Serve demo data even when a credential is present
    pub prefer_mock: bool,
    /// Delay demo responses so they arrive like network responses would
    pub simulate_latency: bool,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            prefer_mock: false,
            simulate_latency: true,
        }
    }
}

/// Serves live data from `S` until the first failure, demo data after that
///
/// The switch to demo data is sticky for the lifetime of the instance: once a
/// live call fails no further live call is attempted, even if the service
/// recovers. Build a fresh instance to probe the service again.
pub struct FallbackClient<S = RemoteClient> {
    inner: S,
    using_mock: AtomicBool,
    simulate_latency: bool,
}

impl FallbackClient<RemoteClient> {
    pub fn connect(http: Client, upstream: &UpstreamConfig) -> Result<Self> {
        let api_key = upstream.api_key.as_deref();
        let remote = RemoteClient::new(
            http,
            &upstream.base_url,
            api_key.unwrap_or(DEMO_API_KEY),
        )?;

        Ok(Self::new(
            remote,
            api_key,
            FallbackOptions {
                prefer_mock: upstream.prefer_mock,
                simulate_latency: upstream.mock_latency,
            },
        ))
    }
}

impl<S: EmissionsSource> FallbackClient<S> {
    /// Starts in demo mode when `api_key` is missing, empty or the demo
    /// sentinel, or when `options.prefer_mock` is set
    pub fn new(inner: S, api_key: Option<&str>, options: FallbackOptions) -> Self {
        let has_credential = api_key.is_some_and(|key| !key.is_empty() && key != DEMO_API_KEY);

        Self {
            inner,
            using_mock: AtomicBool::new(!has_credential || options.prefer_mock),
            simulate_latency: options.simulate_latency,
        }
    }

    pub fn is_mock_mode(&self) -> bool {
        self.using_mock.load(Ordering::Relaxed)
    }

    async fn pause(&self, latency: Duration) {
        if self.simulate_latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn downgrade(&self, operation: &'static str, err: &ClientError) {
        // Concurrent failures may both land here; the flag only ever goes one way.
        self.using_mock.store(true, Ordering::Relaxed);
        warn!(operation, error = %err, "emissions service unavailable, switching to demo data");
    }

    async fn serve<T, F>(
        &self,
        operation: &'static str,
        latency: Duration,
        live: F,
        demo: impl FnOnce() -> T,
    ) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.is_mock_mode() {
            debug!(operation, "serving demo data");
            self.pause(latency).await;
            return Ok(demo());
        }

        match live.await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.downgrade(operation, &err);
                Ok(demo())
            }
        }
    }
}

fn mock_emission_count(limit: Option<u32>) -> usize {
    match limit {
        Some(limit) if limit > 0 => clamp_mock_limit(limit),
        _ => mock::DEFAULT_MOCK_EMISSIONS,
    }
}

fn clamp_mock_limit(limit: u32) -> usize {
    usize::try_from(limit)
        .unwrap_or(usize::MAX)
        .min(mock::MAX_MOCK_EMISSIONS)
}

#[async_trait]
impl<S: EmissionsSource> EmissionsSource for FallbackClient<S> {
    async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        self.serve(
            "list_projects",
            PROJECTS_LATENCY,
            self.inner.list_projects(),
            mock::generate_mock_projects,
        )
        .await
    }

    async fn get_project(&self, project_id: &str) -> ClientResult<Project> {
        self.serve(
            "get_project",
            PROJECTS_LATENCY,
            self.inner.get_project(project_id),
            || mock::mock_project(project_id),
        )
        .await
    }

    async fn get_project_emissions(
        &self,
        project_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<u32>,
    ) -> ClientResult<Vec<EmissionRecord>> {
        self.serve(
            "get_project_emissions",
            EMISSIONS_LATENCY,
            self.inner
                .get_project_emissions(project_id, start_date, end_date, limit),
            || mock::generate_mock_emissions(mock_emission_count(limit)),
        )
        .await
    }

    async fn get_runs(&self, project_id: &str) -> ClientResult<Vec<Run>> {
        self.serve(
            "get_runs",
            EMISSIONS_LATENCY,
            self.inner.get_runs(project_id),
            || mock::generate_mock_runs(project_id),
        )
        .await
    }

    async fn get_latest_emissions(
        &self,
        project_id: &str,
        limit: u32,
    ) -> ClientResult<Vec<EmissionRecord>> {
        self.serve(
            "get_latest_emissions",
            EMISSIONS_LATENCY,
            self.inner.get_latest_emissions(project_id, limit),
            || mock::generate_mock_emissions(clamp_mock_limit(limit)),
        )
        .await
    }

    async fn get_emissions_summary(
        &self,
        project_id: &str,
        period: SummaryPeriod,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ClientResult<Vec<SummaryBucket>> {
        if self.is_mock_mode() {
            debug!(operation = "get_emissions_summary", "serving demo data");
            self.pause(SUMMARY_LATENCY).await;
            return Ok(mock::generate_mock_summary());
        }

        // A failed live summary yields no buckets rather than demo buckets.
        // TODO: decide with the dashboard whether this should serve generate_mock_summary() too.
        match self
            .inner
            .get_emissions_summary(project_id, period, start_date, end_date)
            .await
        {
            Ok(summary) => Ok(summary),
            Err(err) => {
                self.downgrade("get_emissions_summary", &err);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::generate_mock_emissions;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Upstream double that counts calls and fails while unhealthy
    #[derive(Clone, Default)]
    struct StubSource {
        calls: Arc<AtomicUsize>,
        unhealthy: Arc<AtomicBool>,
    }

    impl StubSource {
        fn failing() -> Self {
            let stub = Self::default();
            stub.unhealthy.store(true, Ordering::SeqCst);
            stub
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn recover(&self) {
            self.unhealthy.store(false, Ordering::SeqCst);
        }

        fn check(&self) -> ClientResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unhealthy.load(Ordering::SeqCst) {
                return Err(ClientError::RemoteService {
                    status: 503,
                    status_text: "Service Unavailable".to_string(),
                });
            }
            Ok(())
        }

        fn live_project(id: &str) -> Project {
            Project {
                id: id.to_string(),
                ..mock::mock_project("live")
            }
        }
    }

    #[async_trait]
    impl EmissionsSource for StubSource {
        async fn list_projects(&self) -> ClientResult<Vec<Project>> {
            self.check()?;
            Ok(vec![Self::live_project("live-1")])
        }

        async fn get_project(&self, project_id: &str) -> ClientResult<Project> {
            self.check()?;
            Ok(Self::live_project(project_id))
        }

        async fn get_project_emissions(
            &self,
            _project_id: &str,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
            _limit: Option<u32>,
        ) -> ClientResult<Vec<EmissionRecord>> {
            self.check()?;
            Ok(generate_mock_emissions(2))
        }

        async fn get_runs(&self, _project_id: &str) -> ClientResult<Vec<Run>> {
            self.check()?;
            Ok(Vec::new())
        }

        async fn get_latest_emissions(
            &self,
            _project_id: &str,
            _limit: u32,
        ) -> ClientResult<Vec<EmissionRecord>> {
            self.check()?;
            Ok(generate_mock_emissions(1))
        }

        async fn get_emissions_summary(
            &self,
            _project_id: &str,
            _period: SummaryPeriod,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
        ) -> ClientResult<Vec<SummaryBucket>> {
            self.check()?;
            Ok(vec![SummaryBucket {
                period: "2024-01-01".to_string(),
                total_emissions: 1.0,
                total_energy: 2.0,
                avg_emissions_rate: 0.1,
                count: 3,
            }])
        }
    }

    fn quick() -> FallbackOptions {
        FallbackOptions {
            prefer_mock: false,
            simulate_latency: false,
        }
    }

    #[tokio::test]
    async fn test_without_credential_never_calls_upstream() {
        for key in [None, Some(""), Some(DEMO_API_KEY)] {
            let stub = StubSource::default();
            let client = FallbackClient::new(stub.clone(), key, quick());
            assert!(client.is_mock_mode());

            let projects = client.list_projects().await.unwrap();
            assert_eq!(projects.len(), 3);
            client.get_project_emissions("p", None, None, None).await.unwrap();
            client.get_runs("p").await.unwrap();
            client
                .get_emissions_summary("p", SummaryPeriod::Day, None, None)
                .await
                .unwrap();

            assert_eq!(stub.calls(), 0);
            assert!(client.is_mock_mode());
        }
    }

    #[tokio::test]
    async fn test_prefer_mock_overrides_valid_credential() {
        let stub = StubSource::default();
        let client = FallbackClient::new(
            stub.clone(),
            Some("real-key"),
            FallbackOptions {
                prefer_mock: true,
                simulate_latency: false,
            },
        );

        assert!(client.is_mock_mode());
        client.get_project("demo-project-1").await.unwrap();
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_live_results_pass_through() {
        let stub = StubSource::default();
        let client = FallbackClient::new(stub.clone(), Some("real-key"), quick());
        assert!(!client.is_mock_mode());

        let projects = client.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "live-1");

        let summary = client
            .get_emissions_summary("p", SummaryPeriod::Week, None, None)
            .await
            .unwrap();
        assert_eq!(summary.len(), 1);

        assert_eq!(stub.calls(), 2);
        assert!(!client.is_mock_mode());
    }

    #[tokio::test]
    async fn test_failure_downgrades_for_good() {
        let stub = StubSource::failing();
        let client = FallbackClient::new(stub.clone(), Some("real-key"), quick());

        let projects = client.list_projects().await.unwrap();
        assert_eq!(projects.len(), 3);
        assert_eq!(projects[0].id, "demo-project-1");
        assert!(client.is_mock_mode());

        // The service is back, but this instance stays on demo data
        stub.recover();
        let project = client.get_project("demo-project-2").await.unwrap();
        assert_eq!(project.name, "Machine Learning Pipeline");
        let records = client
            .get_project_emissions("p", None, None, Some(4))
            .await
            .unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(stub.calls(), 1);
        assert!(client.is_mock_mode());
    }

    #[tokio::test]
    async fn test_failed_summary_is_empty() {
        let stub = StubSource::failing();
        let client = FallbackClient::new(stub.clone(), Some("real-key"), quick());

        let summary = client
            .get_emissions_summary("p", SummaryPeriod::Day, None, None)
            .await
            .unwrap();
        assert!(summary.is_empty());
        assert!(client.is_mock_mode());

        // Later summaries come from the generator
        let summary = client
            .get_emissions_summary("p", SummaryPeriod::Day, None, None)
            .await
            .unwrap();
        assert_eq!(summary.len(), 7);
    }

    #[tokio::test]
    async fn test_mock_emission_counts() {
        let client = FallbackClient::new(StubSource::default(), None, quick());

        let default = client
            .get_project_emissions("p", None, None, None)
            .await
            .unwrap();
        assert_eq!(default.len(), mock::DEFAULT_MOCK_EMISSIONS);

        let zero = client
            .get_project_emissions("p", None, None, Some(0))
            .await
            .unwrap();
        assert_eq!(zero.len(), mock::DEFAULT_MOCK_EMISSIONS);

        let latest = client.get_latest_emissions("p", 12).await.unwrap();
        assert_eq!(latest.len(), 12);
    }

    #[tokio::test]
    async fn test_huge_limits_are_capped() {
        let client = FallbackClient::new(StubSource::default(), None, quick());

        let records = client
            .get_project_emissions("p", None, None, Some(u32::MAX))
            .await
            .unwrap();
        assert_eq!(records.len(), mock::MAX_MOCK_EMISSIONS);

        let latest = client.get_latest_emissions("p", u32::MAX).await.unwrap();
        assert_eq!(latest.len(), mock::MAX_MOCK_EMISSIONS);
    }

    #[tokio::test]
    async fn test_mock_latency_is_applied() {
        let client = FallbackClient::new(StubSource::default(), None, FallbackOptions::default());

        let start = std::time::Instant::now();
        client.get_runs("p").await.unwrap();
        assert!(start.elapsed() >= EMISSIONS_LATENCY);
    }
}
