use crate::results::{RequestResult, TestSummary};

/// Nearest-rank percentile over latencies already sorted ascending.
///
/// Uses `index = ceil(p * n / 100) - 1`, clamped into `[0, n - 1]`.
/// Returns 0 for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil();
    // A negative rank saturates to 0 in the float-to-int cast.
    let idx = (rank as usize).saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

/// Reduce a run's results into a [`TestSummary`].
///
/// `total_time_ms` is the measured wall-clock length of the run and is used
/// only for the throughput figure.
pub fn summarize(results: &[RequestResult], total_time_ms: f64) -> TestSummary {
    let total = results.len() as u64;
    let successful = results.iter().filter(|r| r.success).count() as u64;
    let bytes_transferred = results.iter().map(|r| r.size_bytes).sum();

    if total == 0 {
        return TestSummary {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            total_time_ms,
            average_latency_ms: 0.0,
            min_latency_ms: 0.0,
            max_latency_ms: 0.0,
            p50_latency_ms: 0.0,
            p95_latency_ms: 0.0,
            p99_latency_ms: 0.0,
            requests_per_second: 0.0,
            bytes_transferred,
        };
    }

    let mut latencies: Vec<f64> = results.iter().map(|r| r.latency_ms).collect();
    latencies.sort_by(|a, b| a.total_cmp(b));

    let min = latencies[0];
    let max = latencies[latencies.len() - 1];
    let mean = latencies.iter().sum::<f64>() / latencies.len() as f64;

    let requests_per_second = if total_time_ms > 0.0 {
        total as f64 / (total_time_ms / 1000.0)
    } else {
        0.0
    };

    TestSummary {
        total_requests: total,
        successful_requests: successful,
        failed_requests: total - successful,
        total_time_ms,
        // Summation rounding must not push the mean outside the observed range.
        average_latency_ms: mean.clamp(min, max),
        min_latency_ms: min,
        max_latency_ms: max,
        p50_latency_ms: percentile(&latencies, 50.0),
        p95_latency_ms: percentile(&latencies, 95.0),
        p99_latency_ms: percentile(&latencies, 99.0),
        requests_per_second,
        bytes_transferred,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
