use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::engine::executor::RequestExecutor;
use crate::engine::EngineStatus;
use crate::error::GladiatorError;
use crate::plan::model::{TargetApi, TestConfiguration};
use crate::plan::validation::validate_configuration;
use crate::results::RequestResult;

/// Drives rounds of concurrent requests until a soft deadline passes.
///
/// Each round launches exactly `concurrency` requests and waits for all of
/// them before the deadline is checked again, so at most `concurrency`
/// requests are ever in flight. A started round is never cut short: the run
/// may overshoot `duration_seconds` by up to one round.
///
/// With `delay_ms > 0` consecutive launches inside a round are spaced by that
/// delay (intra-round launch throttling). There is no pause between rounds.
pub struct LoadScheduler {
    executor: RequestExecutor,
    status: Arc<RwLock<EngineStatus>>,
}

impl LoadScheduler {
    pub fn new(executor: RequestExecutor) -> Self {
        Self {
            executor,
            status: Arc::new(RwLock::new(EngineStatus::Idle)),
        }
    }

    /// Shared view of the lifecycle state, readable while a run is going.
    pub fn status(&self) -> Arc<RwLock<EngineStatus>> {
        Arc::clone(&self.status)
    }

    /// Run the load test and return every result in round-then-launch order.
    ///
    /// # Errors
    ///
    /// Returns [`GladiatorError::Configuration`] for an invalid
    /// configuration, before any request is issued. Per-request failures are
    /// never errors; they are recorded in the returned results.
    pub async fn run(
        &self,
        target: &TargetApi,
        config: &TestConfiguration,
    ) -> Result<Vec<RequestResult>, GladiatorError> {
        validate_configuration(config)?;

        let target = Arc::new(target.clone());
        let delay = Duration::from_millis(config.delay_ms);
        let start = Instant::now();
        let deadline = start
            .checked_add(Duration::from_secs(config.duration_seconds))
            .ok_or_else(|| {
                GladiatorError::Configuration(format!(
                    "duration_seconds {} is out of range",
                    config.duration_seconds
                ))
            })?;

        self.set_status(EngineStatus::Running).await;
        tracing::info!(
            url = %target.url,
            test_type = %config.test_type,
            duration_s = config.duration_seconds,
            concurrency = config.concurrency,
            delay_ms = config.delay_ms,
            "load test started"
        );

        let mut results = Vec::new();
        let mut round: u64 = 0;
        while Instant::now() < deadline {
            round += 1;
            let batch = self.run_round(&target, config.concurrency, delay).await;
            tracing::debug!(
                round,
                completed = batch.len(),
                failed = batch.iter().filter(|r| !r.success).count(),
                "round finished"
            );
            results.extend(batch);
        }

        self.set_status(EngineStatus::Completed).await;
        tracing::info!(
            rounds = round,
            requests = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "load test completed"
        );

        Ok(results)
    }

    /// Launch one round and wait for all of it. Results keep launch order
    /// regardless of which request settles first.
    async fn run_round(
        &self,
        target: &Arc<TargetApi>,
        concurrency: u32,
        delay: Duration,
    ) -> Vec<RequestResult> {
        let mut handles = Vec::with_capacity(concurrency as usize);

        for _ in 0..concurrency {
            let executor = self.executor.clone();
            let target = Arc::clone(target);
            handles.push(tokio::spawn(async move {
                executor.execute(&target.url, &target.headers).await
            }));

            if !delay.is_zero() {
                sleep(delay).await;
            }
        }

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    tracing::error!("request task failed: {e}");
                    RequestResult::transport_failure(
                        Utc::now(),
                        0.0,
                        format!("Request task failed: {e}"),
                    )
                })
            })
            .collect()
    }

    async fn set_status(&self, status: EngineStatus) {
        let mut s = self.status.write().await;
        *s = status;
    }
}
