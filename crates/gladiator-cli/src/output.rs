use colored::*;

use gladiator_core::registry::ApiRecord;
use gladiator_core::results::{ComparisonResult, ResultSummaryEntry, TestRunResult, TestSummary};

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

fn error_rate_label(rate: f64) -> ColoredString {
    let text = format!("{:.2}%", rate * 100.0);
    if rate == 0.0 {
        text.green()
    } else if rate < 0.05 {
        text.yellow()
    } else {
        text.red()
    }
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", label.blue().bold(), value);
}

pub fn print_summary(summary: &TestSummary) {
    row("Total requests", summary.total_requests);
    row("Successful", summary.successful_requests.to_string().green());
    row(
        "Failed",
        if summary.failed_requests == 0 {
            summary.failed_requests.to_string().normal()
        } else {
            summary.failed_requests.to_string().red()
        },
    );
    row("Error rate", error_rate_label(summary.error_rate()));
    row("Total time", format!("{:.0} ms", summary.total_time_ms));
    row("Requests/sec", format!("{:.2}", summary.requests_per_second));
    row("Average latency", format!("{:.2} ms", summary.average_latency_ms));
    row("Min latency", format!("{:.2} ms", summary.min_latency_ms));
    row("Max latency", format!("{:.2} ms", summary.max_latency_ms));
    row("p50 latency", format!("{:.2} ms", summary.p50_latency_ms));
    row("p95 latency", format!("{:.2} ms", summary.p95_latency_ms));
    row("p99 latency", format!("{:.2} ms", summary.p99_latency_ms));
    row("Bytes transferred", summary.bytes_transferred);
}

pub fn print_run(run: &TestRunResult) {
    println!(
        "{} {} test of {}",
        "Run".bold(),
        run.test_type.to_string().cyan(),
        run.target_url.bold()
    );
    row("Run id", run.run_id);
    if let Some(api_id) = run.api_id {
        row("API id", api_id);
    }
    row("Started", run.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    row(
        "Config",
        format!(
            "{}s, concurrency {}, delay {} ms",
            run.config.duration_seconds, run.config.concurrency, run.config.delay_ms
        ),
    );
    print_summary(&run.summary);
}

pub fn print_entries(entries: &[ResultSummaryEntry]) {
    if entries.is_empty() {
        println!("No results found.");
        return;
    }
    println!(
        "{:<36}  {:<10}  {:<19}  {:>8}  {:>9}  {:>10}  {:>10}  {:>8}",
        "RUN ID", "TYPE", "STARTED", "REQUESTS", "RPS", "AVG (ms)", "P95 (ms)", "ERRORS"
    );
    for e in entries {
        println!(
            "{:<36}  {:<10}  {:<19}  {:>8}  {:>9.2}  {:>10.2}  {:>10.2}  {:>8}",
            e.run_id,
            e.test_type.to_string(),
            e.started_at.format("%Y-%m-%d %H:%M:%S"),
            e.total_requests,
            e.requests_per_second,
            e.average_latency_ms,
            e.p95_latency_ms,
            error_rate_label(e.error_rate),
        );
    }
}

pub fn print_apis(records: &[ApiRecord]) {
    if records.is_empty() {
        println!("No APIs registered.");
        return;
    }
    println!("{:<36}  {:<20}  {:<8}  {}", "ID", "NAME", "CATEGORY", "URL");
    for r in records {
        println!("{:<36}  {:<20}  {:<8}  {}", r.id, r.name, r.category, r.url);
    }
}

fn delta(value: f64, lower_is_better: bool, unit: &str) -> ColoredString {
    let text = format!("{value:+.2}{unit}");
    let better = if lower_is_better { value < 0.0 } else { value > 0.0 };
    if value == 0.0 {
        text.normal()
    } else if better {
        text.green()
    } else {
        text.red()
    }
}

pub fn print_comparison(cmp: &ComparisonResult) {
    println!(
        "{} {} ({}) {} {} ({})",
        "Comparing".bold(),
        cmp.run_a.run_id,
        cmp.run_a.test_type,
        "vs".bold(),
        cmp.run_b.run_id,
        cmp.run_b.test_type
    );
    println!("{:<18} {:>12} {:>12} {:>14}", "", "A", "B", "B - A");
    println!(
        "{:<18} {:>12} {:>12} {:>14}",
        "Requests",
        cmp.run_a.total_requests,
        cmp.run_b.total_requests,
        format!("{:+}", cmp.delta_total_requests)
    );
    println!(
        "{:<18} {:>12.2} {:>12.2} {:>14}",
        "Requests/sec",
        cmp.run_a.requests_per_second,
        cmp.run_b.requests_per_second,
        delta(cmp.delta_rps, false, "")
    );
    println!(
        "{:<18} {:>12.2} {:>12.2} {:>14}",
        "Average (ms)",
        cmp.run_a.average_latency_ms,
        cmp.run_b.average_latency_ms,
        delta(cmp.delta_average_ms, true, "")
    );
    println!(
        "{:<18} {:>12.2} {:>12.2} {:>14}",
        "p95 (ms)",
        cmp.run_a.p95_latency_ms,
        cmp.run_b.p95_latency_ms,
        delta(cmp.delta_p95_ms, true, "")
    );
    println!("{:<18} {:>12} {:>12} {:>14}", "p99 (ms)", "", "", delta(cmp.delta_p99_ms, true, ""));
    println!(
        "{:<18} {:>12} {:>12} {:>14}",
        "Error rate",
        format!("{:.2}%", cmp.run_a.error_rate * 100.0),
        format!("{:.2}%", cmp.run_b.error_rate * 100.0),
        delta(cmp.delta_error_rate * 100.0, true, "%")
    );
}
