use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::engine::{summarize, LoadScheduler, RequestExecutor};
use crate::error::GladiatorError;
use crate::http::{HttpClient, HttpClientBuilder};
use crate::plan::model::{TargetApi, TestConfiguration, TestType};
use crate::plan::validation::validate_configuration;
use crate::registry::{probe_endpoint, ApiRecord, ApiRegistry, NewApi};
use crate::results::{assemble, compare_results, ComparisonResult, ResultStore, RunContext, TestRunResult};

/// Outcome of registering an API.
#[derive(Debug, Clone)]
pub struct Registration {
    pub record: ApiRecord,
    /// `None` when the probe was skipped; otherwise the status code seen or
    /// the reason the endpoint could not be reached.
    pub probe: Option<Result<u16, String>>,
}

/// Ties the engine to the registry and result store.
///
/// The registry and store are injected, so the same service runs against
/// in-memory collaborators in tests and file-backed ones from the CLI.
pub struct TestService {
    registry: Arc<dyn ApiRegistry>,
    store: Arc<dyn ResultStore>,
    config: AppConfig,
    client: HttpClient,
}

impl TestService {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built from `config`.
    pub fn new(
        registry: Arc<dyn ApiRegistry>,
        store: Arc<dyn ResultStore>,
        config: AppConfig,
    ) -> Result<Self, GladiatorError> {
        let client = HttpClientBuilder::from_config(&config).build()?;
        Ok(Self {
            registry,
            store,
            config,
            client,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn ApiRegistry {
        self.registry.as_ref()
    }

    pub fn store(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }

    fn executor(&self) -> RequestExecutor {
        RequestExecutor::new(self.client.clone())
    }

    /// Register an API, optionally probing it first.
    ///
    /// A failed probe is reported back but does not block registration.
    pub async fn register(&self, api: NewApi, probe: bool) -> Result<Registration, GladiatorError> {
        let record = api.into_record()?;

        let probe = if probe {
            let timeout = Duration::from_millis(self.config.probe_timeout_ms);
            let outcome = probe_endpoint(&self.executor(), &record.target(), timeout).await;
            match &outcome {
                Ok(status) => tracing::debug!(url = %record.url, status, "endpoint reachable"),
                Err(reason) => {
                    tracing::warn!(url = %record.url, "endpoint validation failed: {reason}")
                }
            }
            Some(outcome)
        } else {
            None
        };

        let record = self.registry.register(record).await?;
        tracing::info!(api_id = %record.id, name = %record.name, "API registered");
        Ok(Registration { record, probe })
    }

    /// Run a load test against a registered API and store the result.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned before any request is made, as is
    /// [`GladiatorError::NotFound`] for an unknown id. Request failures are
    /// part of the returned result, never an error.
    pub async fn run_test(
        &self,
        api_id: Uuid,
        config: &TestConfiguration,
    ) -> Result<TestRunResult, GladiatorError> {
        validate_configuration(config)?;
        let target = self.registry.get(api_id).await?;

        let run = self.execute(Some(api_id), &target, config).await?;
        self.store.save(&run).await?;
        tracing::info!(run_id = %run.run_id, %api_id, "test results saved");
        Ok(run)
    }

    /// Run a load test against an arbitrary target. Nothing is stored.
    pub async fn run_against(
        &self,
        target: &TargetApi,
        config: &TestConfiguration,
    ) -> Result<TestRunResult, GladiatorError> {
        self.execute(None, target, config).await
    }

    async fn execute(
        &self,
        api_id: Option<Uuid>,
        target: &TargetApi,
        config: &TestConfiguration,
    ) -> Result<TestRunResult, GladiatorError> {
        let scheduler = LoadScheduler::new(self.executor());

        let started_at = Utc::now();
        let start = Instant::now();
        let raw_results = scheduler.run(target, config).await?;
        let total_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let summary = summarize(&raw_results, total_time_ms);
        Ok(assemble(
            summary,
            raw_results,
            RunContext {
                api_id,
                target_url: target.url.clone(),
                config: config.clone(),
                started_at,
                finished_at: Utc::now(),
            },
        ))
    }

    /// Compare the latest stored runs of two APIs (`versus` minus `api_id`).
    pub async fn compare(
        &self,
        api_id: Uuid,
        versus: Uuid,
        test_type: Option<TestType>,
    ) -> Result<ComparisonResult, GladiatorError> {
        let a = self.latest_run(api_id, test_type).await?;
        let b = self.latest_run(versus, test_type).await?;
        Ok(compare_results(&a, &b))
    }

    async fn latest_run(
        &self,
        api_id: Uuid,
        test_type: Option<TestType>,
    ) -> Result<TestRunResult, GladiatorError> {
        self.store
            .latest(api_id, test_type)
            .await?
            .ok_or_else(|| {
                let kind = test_type.map(|t| format!("{t} ")).unwrap_or_default();
                GladiatorError::NotFound(format!("no {kind}results for API {api_id}"))
            })
    }
}
