use std::str::FromStr;

use chrono::SecondsFormat;

use super::{ResultSummaryEntry, TestRunResult};
use crate::error::GladiatorError;

/// Output formats accepted by `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unsupported export format '{other}' (expected json or csv)")),
        }
    }
}

/// Render a run in the requested format.
pub fn export_run(run: &TestRunResult, format: ExportFormat) -> Result<String, GladiatorError> {
    match format {
        ExportFormat::Json => export_json(run),
        ExportFormat::Csv => export_csv(run),
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Export a run as CSV.
///
/// Produces a text document with:
/// - Leading comment lines (prefixed `#`) containing the run summary.
/// - A header row.
/// - One data row per raw request result, in recorded order.
pub fn export_csv(run: &TestRunResult) -> Result<String, GladiatorError> {
    let s = &run.summary;
    let mut out = String::new();

    out.push_str(&format!("# api gladiator run {}\n", run.run_id.hyphenated()));
    if let Some(api_id) = run.api_id {
        out.push_str(&format!("# API: {api_id}\n"));
    }
    out.push_str(&format!("# Target: {}\n", run.target_url));
    out.push_str(&format!(
        "# Type: {}  Duration: {}s  Concurrency: {}  Delay: {}ms\n",
        run.test_type, run.config.duration_seconds, run.config.concurrency, run.config.delay_ms
    ));
    out.push_str(&format!(
        "# Started: {}\n",
        run.started_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    out.push_str(&format!(
        "# Requests: {} total, {} successful, {} failed ({:.2}%)\n",
        s.total_requests,
        s.successful_requests,
        s.failed_requests,
        s.error_rate() * 100.0
    ));
    out.push_str(&format!(
        "# Latency: avg {:.2}ms  min {:.2}ms  max {:.2}ms\n",
        s.average_latency_ms, s.min_latency_ms, s.max_latency_ms
    ));
    out.push_str(&format!(
        "# P50: {:.2}ms  P95: {:.2}ms  P99: {:.2}ms\n",
        s.p50_latency_ms, s.p95_latency_ms, s.p99_latency_ms
    ));
    out.push_str(&format!(
        "# Throughput: {:.2} req/s  Bytes: {}\n",
        s.requests_per_second, s.bytes_transferred
    ));
    out.push('\n');

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "timestamp",
        "latency_ms",
        "status_code",
        "size_bytes",
        "success",
        "error",
    ])?;
    for r in &run.raw_results {
        wtr.write_record([
            r.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            format!("{:.3}", r.latency_ms),
            r.status_code.to_string(),
            r.size_bytes.to_string(),
            r.success.to_string(),
            r.error.clone().unwrap_or_default(),
        ])?;
    }

    out.push_str(&finish(wtr)?);
    Ok(out)
}

/// Export a listing of stored runs as CSV, one row per entry.
pub fn export_entries_csv(entries: &[ResultSummaryEntry]) -> Result<String, GladiatorError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "run_id",
        "api_id",
        "type",
        "started_at",
        "duration_s",
        "total_requests",
        "rps",
        "avg_ms",
        "p95_ms",
        "error_rate",
    ])?;
    for e in entries {
        wtr.write_record([
            e.run_id.to_string(),
            e.api_id.map(|id| id.to_string()).unwrap_or_default(),
            e.test_type.to_string(),
            e.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            e.duration_seconds.to_string(),
            e.total_requests.to_string(),
            format!("{:.2}", e.requests_per_second),
            format!("{:.2}", e.average_latency_ms),
            format!("{:.2}", e.p95_latency_ms),
            format!("{:.4}", e.error_rate),
        ])?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, GladiatorError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| GladiatorError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| GladiatorError::Internal(format!("CSV is not UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Export a run as pretty-printed JSON.
pub fn export_json(run: &TestRunResult) -> Result<String, GladiatorError> {
    Ok(serde_json::to_string_pretty(run)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
