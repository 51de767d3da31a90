mod support;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use gladiator_core::engine::{summarize, LoadScheduler, RequestExecutor};
use gladiator_core::http::HttpClient;
use gladiator_core::plan::{TargetApi, TestConfiguration, TestType};
use gladiator_core::GladiatorError;

use support::{unreachable_url, Reply, TestServer};

fn executor() -> RequestExecutor {
    let client = HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client should build");
    RequestExecutor::new(client)
}

fn config(duration_seconds: u64, concurrency: u32, delay_ms: u64) -> TestConfiguration {
    TestConfiguration {
        test_type: TestType::Latency,
        duration_seconds,
        concurrency,
        delay_ms,
    }
}

// ---------------------------------------------------------------------------
// RequestExecutor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn executor_records_status_and_body_size() {
    let server = TestServer::start(Reply::new(200, vec![b'x'; 100])).await;
    let result = executor().execute(&server.url, &HashMap::new()).await;

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.status_code, 200);
    assert_eq!(result.size_bytes, 100);
    assert!(result.latency_ms > 0.0);
}

#[tokio::test]
async fn executor_treats_server_errors_as_responses() {
    let server = TestServer::start(Reply::new(503, "unavailable")).await;
    let result = executor().execute(&server.url, &HashMap::new()).await;

    assert!(!result.success);
    assert!(result.error.is_none());
    assert_eq!(result.status_code, 503);
    assert_eq!(result.size_bytes, 11);
}

#[tokio::test]
async fn executor_sends_headers() {
    let server = TestServer::start(Reply::new(200, "ok")).await;
    let target = TargetApi::new(server.url.clone()).with_authorization("Bearer s3cret");
    executor().execute(&target.url, &target.headers).await;

    let heads = server.request_heads();
    assert_eq!(heads.len(), 1);
    assert!(heads[0].starts_with("GET /endpoint"));
    assert!(heads[0].to_ascii_lowercase().contains("authorization: bearer s3cret"));
}

#[tokio::test]
async fn executor_latency_includes_server_delay() {
    let server = TestServer::start(Reply::new(200, "ok").after(Duration::from_millis(150))).await;
    let result = executor().execute(&server.url, &HashMap::new()).await;
    assert!(result.latency_ms >= 150.0, "latency = {}", result.latency_ms);
}

// ---------------------------------------------------------------------------
// LoadScheduler scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn healthy_target_all_requests_succeed() {
    let server = TestServer::start(Reply::new(200, vec![b'a'; 100])).await;
    let target = TargetApi::new(server.url.clone());

    let started = Instant::now();
    let results = LoadScheduler::new(executor())
        .run(&target, &config(1, 2, 0))
        .await
        .expect("run should complete");
    let summary = summarize(&results, started.elapsed().as_secs_f64() * 1000.0);

    assert!(summary.total_requests >= 2);
    assert_eq!(results.len() as u64, summary.total_requests);
    assert_eq!(summary.successful_requests, summary.total_requests);
    assert_eq!(summary.failed_requests, 0);
    assert_eq!(summary.bytes_transferred, 100 * summary.total_requests);
    assert_eq!(server.hits() as u64, summary.total_requests);
}

#[tokio::test]
async fn status_500_is_failure_but_499_is_success() {
    let failing = TestServer::start(Reply::new(500, "boom")).await;
    let results = LoadScheduler::new(executor())
        .run(&TargetApi::new(failing.url.clone()), &config(1, 2, 0))
        .await
        .expect("run should complete");
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| !r.success && r.error.is_none() && r.status_code == 500));

    let client_error = TestServer::start(Reply::new(499, "closed")).await;
    let results = LoadScheduler::new(executor())
        .run(&TargetApi::new(client_error.url.clone()), &config(1, 2, 0))
        .await
        .expect("run should complete");
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.success && r.status_code == 499));
}

#[tokio::test]
async fn unreachable_target_still_produces_a_summary() {
    let target = TargetApi::new(unreachable_url());
    let results = LoadScheduler::new(executor())
        .run(&target, &config(1, 2, 0))
        .await
        .expect("run should complete");
    let summary = summarize(&results, 1_000.0);

    assert!(summary.total_requests >= 2);
    assert_eq!(summary.successful_requests, 0);
    assert_eq!(summary.failed_requests, summary.total_requests);
    assert!(results
        .iter()
        .all(|r| r.error.is_some() && r.status_code == 0 && !r.success && r.size_bytes == 0));
}

#[tokio::test]
async fn invalid_configuration_issues_no_requests() {
    let server = TestServer::start(Reply::new(200, "ok")).await;
    let target = TargetApi::new(server.url.clone());
    let scheduler = LoadScheduler::new(executor());

    for bad in [config(0, 2, 0), config(1, 0, 0)] {
        let err = scheduler.run(&target, &bad).await.unwrap_err();
        assert!(matches!(err, GladiatorError::Configuration(_)));
    }
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn rounds_never_exceed_concurrency_and_finish_past_deadline() {
    let server =
        TestServer::start(Reply::new(200, "ok").after(Duration::from_millis(300))).await;
    let target = TargetApi::new(server.url.clone());

    let started = Instant::now();
    let results = LoadScheduler::new(executor())
        .run(&target, &config(1, 3, 0))
        .await
        .expect("run should complete");
    let elapsed = started.elapsed();

    assert_eq!(results.len() % 3, 0, "only whole rounds are recorded");
    assert!(server.max_in_flight() <= 3);
    // The last round starts before the deadline and is allowed to finish.
    assert!(elapsed >= Duration::from_secs(1));
    assert!(results.iter().all(|r| r.success));
}

#[tokio::test]
async fn launch_delay_spaces_requests_within_a_round() {
    let server = TestServer::start(Reply::new(200, "ok")).await;
    let target = TargetApi::new(server.url.clone());

    let results = LoadScheduler::new(executor())
        .run(&target, &config(1, 5, 50))
        .await
        .expect("run should complete");

    assert_eq!(results.len() % 5, 0);
    // Within a round, launch timestamps are at least the delay apart.
    for round in results.chunks(5) {
        for pair in round.windows(2) {
            let gap = pair[1].timestamp - pair[0].timestamp;
            assert!(gap.num_milliseconds() >= 45, "gap = {gap}");
        }
    }
}
