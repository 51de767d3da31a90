pub mod export;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::model::{TestConfiguration, TestType};

pub use store::{FileResultStore, InMemoryResultStore, ResultFilter, ResultStore};

// ---------------------------------------------------------------------------
// RequestResult
// ---------------------------------------------------------------------------

/// Outcome of a single timed request. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestResult {
    pub timestamp: DateTime<Utc>,
    /// Monotonic time from just before sending until the request settled.
    pub latency_ms: f64,
    /// HTTP status, or 0 when no response was received.
    pub status_code: u16,
    /// Length of the received body in bytes, 0 on transport failure.
    pub size_bytes: u64,
    /// Transport-level failure description (DNS, refused, timeout, TLS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

/// Whether a received status counts as a successful outcome.
///
/// Every 4xx is counted as a success here. This matches the behaviour the
/// tool has always had and stored results depend on it, but it is probably
/// not what most users expect from a performance test.
pub fn is_success_status(status_code: u16) -> bool {
    (200..500).contains(&status_code)
}

impl RequestResult {
    /// A request that received an HTTP response of any status.
    pub fn response(
        timestamp: DateTime<Utc>,
        latency_ms: f64,
        status_code: u16,
        size_bytes: u64,
    ) -> Self {
        Self {
            timestamp,
            latency_ms,
            status_code,
            size_bytes,
            error: None,
            success: is_success_status(status_code),
        }
    }

    /// A request that failed before a complete response was received.
    pub fn transport_failure(
        timestamp: DateTime<Utc>,
        latency_ms: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            latency_ms,
            status_code: 0,
            size_bytes: 0,
            error: Some(error.into()),
            success: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TestSummary
// ---------------------------------------------------------------------------

/// Aggregated statistics of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestSummary {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Wall-clock length of the run (ms).
    pub total_time_ms: f64,
    pub average_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub requests_per_second: f64,
    pub bytes_transferred: u64,
}

impl TestSummary {
    /// Fraction of failed requests in `[0, 1]`, 0 for an empty run.
    pub fn error_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.failed_requests as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// TestRunResult
// ---------------------------------------------------------------------------

/// Complete result of one run: identity, configuration, summary and every
/// raw request result in round-then-launch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestRunResult {
    pub run_id: Uuid,
    /// Registry id of the tested API; `None` for ad-hoc targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_id: Option<Uuid>,
    pub target_url: String,
    pub test_type: TestType,
    pub config: TestConfiguration,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: TestSummary,
    pub raw_results: Vec<RequestResult>,
}

/// Identity and timing of a run, supplied by whoever drove it.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub api_id: Option<Uuid>,
    pub target_url: String,
    pub config: TestConfiguration,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Package a summary and its raw results into a [`TestRunResult`].
pub fn assemble(
    summary: TestSummary,
    raw_results: Vec<RequestResult>,
    context: RunContext,
) -> TestRunResult {
    TestRunResult {
        run_id: Uuid::new_v4(),
        api_id: context.api_id,
        target_url: context.target_url,
        test_type: context.config.test_type,
        config: context.config,
        started_at: context.started_at,
        finished_at: context.finished_at,
        summary,
        raw_results,
    }
}

// ---------------------------------------------------------------------------
// ResultSummaryEntry
// ---------------------------------------------------------------------------

/// Lightweight entry for listing stored runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResultSummaryEntry {
    pub run_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_id: Option<Uuid>,
    pub test_type: TestType,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub total_requests: u64,
    pub requests_per_second: f64,
    pub average_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub error_rate: f64,
}

impl ResultSummaryEntry {
    pub fn from_run(run: &TestRunResult) -> Self {
        let s = &run.summary;
        Self {
            run_id: run.run_id,
            api_id: run.api_id,
            test_type: run.test_type,
            started_at: run.started_at,
            duration_seconds: run.config.duration_seconds,
            total_requests: s.total_requests,
            requests_per_second: s.requests_per_second,
            average_latency_ms: s.average_latency_ms,
            p95_latency_ms: s.p95_latency_ms,
            error_rate: s.error_rate(),
        }
    }
}

// ---------------------------------------------------------------------------
// ComparisonResult
// ---------------------------------------------------------------------------

/// Comparison of two runs. Every delta is `b - a`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComparisonResult {
    pub run_a: ResultSummaryEntry,
    pub run_b: ResultSummaryEntry,
    pub delta_total_requests: i64,
    pub delta_average_ms: f64,
    pub delta_p95_ms: f64,
    pub delta_p99_ms: f64,
    pub delta_rps: f64,
    pub delta_error_rate: f64,
}

pub fn compare_results(a: &TestRunResult, b: &TestRunResult) -> ComparisonResult {
    let (sa, sb) = (&a.summary, &b.summary);
    ComparisonResult {
        run_a: ResultSummaryEntry::from_run(a),
        run_b: ResultSummaryEntry::from_run(b),
        delta_total_requests: sb.total_requests as i64 - sa.total_requests as i64,
        delta_average_ms: sb.average_latency_ms - sa.average_latency_ms,
        delta_p95_ms: sb.p95_latency_ms - sa.p95_latency_ms,
        delta_p99_ms: sb.p99_latency_ms - sa.p99_latency_ms,
        delta_rps: sb.requests_per_second - sa.requests_per_second,
        delta_error_rate: sb.error_rate() - sa.error_rate(),
    }
}

// ---------------------------------------------------------------------------
// Test helpers shared with sibling modules
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a [`TestSummary`] with plausible latency figures.
    pub fn make_summary(total: u64, failed: u64, average_ms: f64) -> TestSummary {
        TestSummary {
            total_requests: total,
            successful_requests: total.saturating_sub(failed),
            failed_requests: failed,
            total_time_ms: 10_000.0,
            average_latency_ms: average_ms,
            min_latency_ms: 10.0,
            max_latency_ms: 500.0,
            p50_latency_ms: 100.0,
            p95_latency_ms: 300.0,
            p99_latency_ms: 490.0,
            requests_per_second: total as f64 / 10.0,
            bytes_transferred: total * 1024,
        }
    }

    pub fn make_run(
        api_id: Option<Uuid>,
        test_type: TestType,
        summary: TestSummary,
        raw_results: Vec<RequestResult>,
    ) -> TestRunResult {
        let now = Utc::now();
        assemble(
            summary,
            raw_results,
            RunContext {
                api_id,
                target_url: "http://example.com/api".to_string(),
                config: TestConfiguration {
                    test_type,
                    ..TestConfiguration::default()
                },
                started_at: now,
                finished_at: now,
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::fixtures::{make_run, make_summary};
    use super::*;

    // -----------------------------------------------------------------------
    // RequestResult classification
    // -----------------------------------------------------------------------

    #[test]
    fn status_boundaries() {
        assert!(!is_success_status(0));
        assert!(!is_success_status(199));
        assert!(is_success_status(200));
        assert!(is_success_status(404));
        assert!(is_success_status(499));
        assert!(!is_success_status(500));
        assert!(!is_success_status(503));
    }

    #[test]
    fn response_with_server_error_is_not_success_but_has_no_error() {
        let r = RequestResult::response(Utc::now(), 12.0, 500, 21);
        assert!(!r.success);
        assert!(r.error.is_none());
        assert_eq!(r.size_bytes, 21);
    }

    #[test]
    fn transport_failure_zeroes_status_and_size() {
        let r = RequestResult::transport_failure(Utc::now(), 3.5, "connection refused");
        assert_eq!(r.status_code, 0);
        assert_eq!(r.size_bytes, 0);
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn error_field_is_omitted_when_absent() {
        let r = RequestResult::response(Utc::now(), 1.0, 200, 2);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["success"], true);
    }

    // -----------------------------------------------------------------------
    // assemble
    // -----------------------------------------------------------------------

    #[test]
    fn assemble_carries_context_and_raw_results() {
        let api_id = Uuid::new_v4();
        let raw = vec![
            RequestResult::response(Utc::now(), 5.0, 200, 10),
            RequestResult::transport_failure(Utc::now(), 1.0, "timeout"),
        ];
        let config = TestConfiguration {
            test_type: TestType::Errors,
            duration_seconds: 3,
            concurrency: 2,
            delay_ms: 0,
        };
        let started_at = Utc::now();
        let run = assemble(
            make_summary(2, 1, 3.0),
            raw.clone(),
            RunContext {
                api_id: Some(api_id),
                target_url: "http://localhost/x".to_string(),
                config: config.clone(),
                started_at,
                finished_at: started_at,
            },
        );

        assert_eq!(run.api_id, Some(api_id));
        assert_eq!(run.test_type, TestType::Errors);
        assert_eq!(run.config, config);
        assert_eq!(run.raw_results, raw);
        assert_eq!(run.summary.total_requests, 2);
    }

    #[test]
    fn assemble_gives_each_run_a_fresh_id() {
        let a = make_run(None, TestType::Latency, make_summary(1, 0, 1.0), Vec::new());
        let b = make_run(None, TestType::Latency, make_summary(1, 0, 1.0), Vec::new());
        assert_ne!(a.run_id, b.run_id);
    }

    // -----------------------------------------------------------------------
    // ResultSummaryEntry
    // -----------------------------------------------------------------------

    #[test]
    fn summary_entry_from_run_fields() {
        let run = make_run(None, TestType::Throughput, make_summary(200, 4, 75.5), Vec::new());
        let entry = ResultSummaryEntry::from_run(&run);
        assert_eq!(entry.run_id, run.run_id);
        assert_eq!(entry.test_type, TestType::Throughput);
        assert_eq!(entry.total_requests, 200);
        assert!((entry.error_rate - 0.02).abs() < 1e-9);
        assert!((entry.average_latency_ms - 75.5).abs() < 1e-9);
    }

    #[test]
    fn error_rate_of_empty_run_is_zero() {
        assert_eq!(make_summary(0, 0, 0.0).error_rate(), 0.0);
    }

    // -----------------------------------------------------------------------
    // compare_results
    // -----------------------------------------------------------------------

    #[test]
    fn compare_results_positive_deltas() {
        let a = make_run(None, TestType::Latency, make_summary(100, 5, 100.0), Vec::new());
        let b = make_run(None, TestType::Latency, make_summary(150, 15, 120.0), Vec::new());

        let cmp = compare_results(&a, &b);
        assert_eq!(cmp.delta_total_requests, 50);
        assert!((cmp.delta_average_ms - 20.0).abs() < 1e-9);
        assert!((cmp.delta_rps - 5.0).abs() < 1e-9);
        assert!((cmp.delta_error_rate - 0.05).abs() < 1e-9);
    }

    #[test]
    fn compare_results_negative_deltas() {
        let a = make_run(None, TestType::Latency, make_summary(200, 0, 150.0), Vec::new());
        let b = make_run(None, TestType::Latency, make_summary(100, 0, 80.0), Vec::new());

        let cmp = compare_results(&a, &b);
        assert_eq!(cmp.delta_total_requests, -100);
        assert!((cmp.delta_average_ms + 70.0).abs() < 1e-9);
    }

    #[test]
    fn compare_results_percentile_deltas() {
        let mut sa = make_summary(100, 0, 50.0);
        sa.p95_latency_ms = 200.0;
        sa.p99_latency_ms = 400.0;
        let mut sb = make_summary(100, 0, 50.0);
        sb.p95_latency_ms = 350.0;
        sb.p99_latency_ms = 490.0;
        let a = make_run(None, TestType::Latency, sa, Vec::new());
        let b = make_run(None, TestType::Latency, sb, Vec::new());

        let cmp = compare_results(&a, &b);
        assert!((cmp.delta_p95_ms - 150.0).abs() < 1e-9);
        assert!((cmp.delta_p99_ms - 90.0).abs() < 1e-9);
    }
}
