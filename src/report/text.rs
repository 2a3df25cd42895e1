use std::fmt::Write as _;
use std::time::Duration;

use super::{MonitorReport, Report};
use crate::domain::{LoadTestResult, TestResult, TestStatus, TestSuiteResult};
use crate::error::AppResult;

/// Human readable rendering of a report.
///
/// # Errors
///
/// Returns an error if writing into the output buffer fails.
pub fn render_text(report: &Report) -> AppResult<String> {
    let mut out = String::new();
    match report {
        Report::Suites(suites) => {
            for suite in suites {
                write_suite(&mut out, suite)?;
            }
        }
        Report::Case(result) => write_case(&mut out, result, "")?,
        Report::Load(result) => write_load(&mut out, result)?,
        Report::Monitors(monitors) => {
            for monitor in monitors {
                write_monitor(&mut out, monitor)?;
            }
        }
    }
    Ok(out)
}

const fn ms(duration: Duration) -> u128 {
    duration.as_millis()
}

const fn status_mark(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "PASS",
        TestStatus::Failed => "FAIL",
        TestStatus::Error => "ERR ",
        TestStatus::Skipped => "SKIP",
    }
}

fn write_suite(out: &mut String, suite: &TestSuiteResult) -> AppResult<()> {
    writeln!(
        out,
        "Suite {} [{}] in {}ms",
        suite.name,
        suite.status.as_str(),
        ms(suite.duration)
    )?;
    for result in &suite.results {
        write_case(out, result, "  ")?;
    }
    writeln!(
        out,
        "Total: {}  Passed: {}  Failed: {}  Skipped: {}  Disabled: {}",
        suite.total, suite.passed, suite.failed, suite.skipped, suite.disabled
    )?;
    let summary = &suite.summary;
    writeln!(out, "Success Rate: {:.2}%", summary.success_rate)?;
    writeln!(
        out,
        "Response Time avg/min/max: {}ms / {}ms / {}ms",
        ms(summary.avg_response_time),
        ms(summary.min_response_time),
        ms(summary.max_response_time)
    )?;
    writeln!(out)?;
    Ok(())
}

fn write_case(out: &mut String, result: &TestResult, indent: &str) -> AppResult<()> {
    let status_code = result
        .response
        .as_ref()
        .map_or_else(|| "-".to_owned(), |response| response.status_code.to_string());
    writeln!(
        out,
        "{}{} {} (status {}, {}ms, {} attempt(s))",
        indent,
        status_mark(result.status),
        result.name,
        status_code,
        ms(result.duration),
        result.attempts
    )?;
    if let Some(error) = result.error.as_deref() {
        writeln!(out, "{}    error: {}", indent, error)?;
    }
    if let Some(reason) = result.skip_reason.as_deref() {
        writeln!(out, "{}    skipped: {}", indent, reason)?;
    }
    for assertion in result.assertions.iter().filter(|assertion| !assertion.passed) {
        writeln!(out, "{}    assertion failed: {}", indent, assertion.message)?;
    }
    Ok(())
}

fn write_load(out: &mut String, result: &LoadTestResult) -> AppResult<()> {
    writeln!(out, "Load test: {}", result.config.test_case.name)?;
    writeln!(out, "Duration: {}s", result.elapsed.as_secs())?;
    writeln!(out, "Peak Users: {}", result.peak_users)?;
    writeln!(out, "Total Requests: {}", result.total_requests)?;
    writeln!(out, "Successful: {}", result.successful_requests)?;
    writeln!(
        out,
        "Failed: {} ({:.2}%)",
        result.failed_requests, result.error_rate
    )?;
    writeln!(out, "Requests/sec: {:.2}", result.requests_per_sec)?;
    writeln!(
        out,
        "Response Time avg/min/max: {}ms / {}ms / {}ms",
        ms(result.avg_response_time),
        ms(result.min_response_time),
        ms(result.max_response_time)
    )?;
    writeln!(
        out,
        "P95/P99: {}ms / {}ms",
        ms(result.p95_response_time),
        ms(result.p99_response_time)
    )?;
    if !result.errors.is_empty() {
        writeln!(out, "Errors:")?;
        for (message, count) in &result.errors {
            writeln!(out, "  {} x {}", count, message)?;
        }
    }
    if !result.timeline.is_empty() {
        writeln!(out, "Timeline:")?;
        for point in &result.timeline {
            writeln!(
                out,
                "  +{}s users={} rps={:.2} avg={}ms errors={:.2}%",
                point.elapsed.as_secs(),
                point.active_users,
                point.requests_per_sec,
                ms(point.avg_response_time),
                point.error_rate
            )?;
        }
    }
    Ok(())
}

fn write_monitor(out: &mut String, report: &MonitorReport) -> AppResult<()> {
    let stats = &report.stats;
    writeln!(
        out,
        "Monitor {} [{}]",
        stats.monitor_id,
        stats.status.as_str()
    )?;
    writeln!(
        out,
        "Checks: {} ({} ok, {} failed)",
        stats.total_checks, stats.successful_checks, stats.failed_checks
    )?;
    writeln!(out, "Uptime: {:.2}%", stats.uptime)?;
    writeln!(out, "Avg Response Time: {}ms", ms(stats.avg_response_time))?;
    let uptime = &report.uptime;
    writeln!(
        out,
        "Uptime ({}): {:.2}% over {} check(s), {} incident(s)",
        uptime.period,
        uptime.overall_uptime,
        uptime.total_checks,
        uptime.incidents.len()
    )?;
    for incident in &uptime.incidents {
        writeln!(
            out,
            "  {} {} for {}s: {}",
            if incident.ongoing { "ongoing" } else { "resolved" },
            incident.started_at.to_rfc3339(),
            incident.duration.as_secs(),
            incident.reason
        )?;
    }
    for alert in &report.alerts {
        writeln!(
            out,
            "  alert {} ({}){}: {}",
            alert.kind.as_str(),
            alert.severity.as_str(),
            if alert.is_resolved() { " resolved" } else { "" },
            alert.message
        )?;
    }
    writeln!(out)?;
    Ok(())
}
