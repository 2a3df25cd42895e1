use super::*;
use crate::domain::{
    Assertion, AssertionKind, AssertionValue, HttpResponse, Operator, RequestTemplate,
    RetryPolicy, SuiteStatus, TestCase, TestResult, TestStatus, TestSuite, Variables,
};
use crate::error::{AppError, TransportError, TransportErrorKind, ValidationError};
use crate::test_support::{ScriptedExecutor, Step, run_paused_test};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const HEALTH_URL: &str = "https://api.example/health";

fn response(status_code: u16, body: &str, millis: u64) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text: String::new(),
        headers: BTreeMap::from([("Content-Type".to_owned(), "application/json".to_owned())]),
        body: body.to_owned(),
        duration: Duration::from_millis(millis),
    }
}

fn health_case(id: &str) -> TestCase {
    TestCase::new(id, RequestTemplate::get(HEALTH_URL)).with_assertion(Assertion::status_equals(200))
}

fn runner(executor: &Arc<ScriptedExecutor>) -> TestCaseRunner {
    TestCaseRunner::new(executor.clone())
}

#[test]
fn status_assertion_reports_actual_and_expected() -> Result<(), String> {
    let assertion = Assertion::status_equals(200);

    let ok = evaluate(&assertion, &response(200, "", 5));
    if !ok.passed || ok.message != "Assertion passed" {
        return Err(format!("Expected pass, got {:?}", ok));
    }

    let failed = evaluate(&assertion, &response(500, "", 5));
    if failed.passed {
        return Err("Expected failure on 500".to_owned());
    }
    if failed.actual != Some(AssertionValue::Integer(500))
        || failed.expected != AssertionValue::Integer(200)
    {
        return Err(format!("Unexpected diagnostics: {:?}", failed));
    }
    if !failed.message.contains("got 500") {
        return Err(format!("Unexpected message: {}", failed.message));
    }
    Ok(())
}

#[test]
fn response_time_uses_whole_milliseconds() -> Result<(), String> {
    let below = Assertion::new(AssertionKind::ResponseTime, Operator::LessThan, 100);
    let mut slow = response(200, "", 0);
    slow.duration = Duration::from_micros(99_900);
    if !evaluate(&below, &slow).passed {
        return Err("99.9ms should count as 99ms".to_owned());
    }
    slow.duration = Duration::from_millis(150);
    let result = evaluate(&below, &slow);
    if result.passed || result.actual != Some(AssertionValue::Integer(150)) {
        return Err(format!("Unexpected result: {:?}", result));
    }
    Ok(())
}

#[test]
fn body_contains_checks_substring() -> Result<(), String> {
    let body = response(200, r#"{"status":"healthy"}"#, 1);
    let contains = Assertion::new(AssertionKind::BodyContains, Operator::Contains, "healthy");
    let missing = Assertion::new(AssertionKind::BodyContains, Operator::Contains, "degraded");
    let absent = Assertion::new(AssertionKind::BodyContains, Operator::NotContains, "error");

    if !evaluate(&contains, &body).passed {
        return Err("Expected substring match".to_owned());
    }
    if evaluate(&missing, &body).passed {
        return Err("Missing substring must fail".to_owned());
    }
    if !evaluate(&absent, &body).passed {
        return Err("not_contains should pass when absent".to_owned());
    }
    let equals = Assertion::new(AssertionKind::BodyContains, Operator::Equals, "healthy");
    let not_equals = Assertion::new(AssertionKind::BodyContains, Operator::NotEquals, "healthy");
    if !evaluate(&equals, &body).passed || evaluate(&not_equals, &body).passed {
        return Err("equals/not_equals should act as contains/not_contains".to_owned());
    }
    Ok(())
}

#[test]
fn header_assertion_is_case_insensitive() -> Result<(), String> {
    let ok = Assertion::new(AssertionKind::Header, Operator::Contains, "json")
        .with_property("content-type");
    if !evaluate(&ok, &response(200, "", 1)).passed {
        return Err("Expected header match".to_owned());
    }

    let missing = Assertion::new(AssertionKind::Header, Operator::Equals, "abc")
        .with_property("x-request-id");
    let result = evaluate(&missing, &response(200, "", 1));
    if result.passed || result.actual.is_some() {
        return Err(format!("Missing header must fail: {:?}", result));
    }
    Ok(())
}

#[test]
fn uninterpretable_assertions_fail_closed() -> Result<(), String> {
    let ok = response(200, "fine", 1);
    let cases = [
        Assertion::new(
            AssertionKind::Unsupported("json_path".to_owned()),
            Operator::Equals,
            200,
        ),
        Assertion::new(
            AssertionKind::StatusCode,
            Operator::Unsupported("roughly".to_owned()),
            200,
        ),
        Assertion::new(AssertionKind::StatusCode, Operator::GreaterThan, "abc"),
        Assertion::new(AssertionKind::BodyContains, Operator::LessThan, 5)
            .with_property("ignored"),
        Assertion::new(
            AssertionKind::BodyContains,
            Operator::Unsupported("roughly".to_owned()),
            "fin",
        ),
        Assertion::new(AssertionKind::BodyContains, Operator::GreaterThan, "fin"),
        Assertion::new(AssertionKind::BodyContains, Operator::LessThan, "fin"),
        Assertion::new(AssertionKind::Header, Operator::Equals, "x"),
    ];
    for assertion in &cases {
        let result = evaluate(assertion, &ok);
        if result.passed || result.message == "Assertion passed" {
            return Err(format!("Expected fail-closed for {:?}", assertion));
        }
    }
    Ok(())
}

#[test]
fn numeric_comparisons_accept_numeric_strings() -> Result<(), String> {
    let ok = response(204, "", 1);
    let greater = Assertion::new(AssertionKind::StatusCode, Operator::GreaterThan, "199");
    let equals = Assertion::new(AssertionKind::StatusCode, Operator::Equals, "204");
    let not_equals = Assertion::new(AssertionKind::StatusCode, Operator::NotEquals, 200);
    for assertion in [&greater, &equals, &not_equals] {
        if !evaluate(assertion, &ok).passed {
            return Err(format!("Expected pass for {:?}", assertion));
        }
    }
    Ok(())
}

#[test]
fn evaluation_is_idempotent() -> Result<(), String> {
    let assertion = Assertion::new(AssertionKind::ResponseTime, Operator::LessThan, 10);
    let slow = response(200, "", 25);
    let first = evaluate(&assertion, &slow);
    let second = evaluate(&assertion, &slow);
    if first != second {
        return Err(format!("Results differ: {:?} vs {:?}", first, second));
    }
    Ok(())
}

#[test]
fn evaluate_all_skips_disabled_assertions() -> Result<(), String> {
    let assertions = vec![
        Assertion::status_equals(200),
        Assertion::status_equals(500).disabled(),
    ];
    let results = evaluate_all(&assertions, &response(200, "", 1));
    if results.len() != 1 || !results.iter().all(|result| result.passed) {
        return Err(format!("Unexpected results: {:?}", results));
    }
    Ok(())
}

#[test]
fn case_passes_on_200_and_fails_on_500() -> Result<(), String> {
    run_paused_test(async {
        let ok = Arc::new(ScriptedExecutor::status(200));
        let result = runner(&ok).run(&health_case("ok"), &Variables::new()).await;
        if result.status != TestStatus::Passed || result.attempts != 1 {
            return Err(format!("Expected passed, got {:?}", result));
        }

        let broken = Arc::new(ScriptedExecutor::status(500));
        let result = runner(&broken)
            .run(&health_case("broken"), &Variables::new())
            .await;
        if result.status != TestStatus::Failed {
            return Err(format!("Expected failed, got {:?}", result.status));
        }
        let assertion = result.assertions.first().ok_or("missing assertion result")?;
        if assertion.actual != Some(AssertionValue::Integer(500))
            || assertion.expected != AssertionValue::Integer(200)
        {
            return Err(format!("Unexpected assertion result: {:?}", assertion));
        }
        if result.response.as_ref().map(|r| r.status_code) != Some(500) {
            return Err("Response should be captured".to_owned());
        }
        Ok(())
    })
}

#[test]
fn case_without_assertions_passes() -> Result<(), String> {
    run_paused_test(async {
        let executor = Arc::new(ScriptedExecutor::status(503));
        let case = TestCase::new("bare", RequestTemplate::get(HEALTH_URL));
        let result = runner(&executor).run(&case, &Variables::new()).await;
        if result.status != TestStatus::Passed {
            return Err(format!("Expected passed, got {:?}", result.status));
        }
        Ok(())
    })
}

#[test]
fn retries_stop_after_count_plus_one_attempts() -> Result<(), String> {
    run_paused_test(async {
        let executor = Arc::new(ScriptedExecutor::new(Step::Hang));
        let case = health_case("hang")
            .with_timeout(Duration::from_secs(1))
            .with_retry(RetryPolicy::new(2, Duration::from_millis(500)));

        let result = runner(&executor).run(&case, &Variables::new()).await;

        if result.status != TestStatus::Error || result.attempts != 3 || executor.calls() != 3 {
            return Err(format!(
                "Expected 3 attempts ending in error, got {:?} after {} ({} calls)",
                result.status,
                result.attempts,
                executor.calls()
            ));
        }
        if !result.assertions.is_empty() || result.response.is_some() {
            return Err("Assertions must not run after transport failure".to_owned());
        }
        let error = result.error.unwrap_or_default();
        if !error.contains("timeout") {
            return Err(format!("Unexpected error message: {}", error));
        }
        // Three timeouts plus two pauses between them.
        if result.duration < Duration::from_secs(4) {
            return Err(format!("Duration too short: {:?}", result.duration));
        }
        if result.finished_at < result.started_at {
            return Err("Timestamps out of order".to_owned());
        }
        Ok(())
    })
}

#[test]
fn retry_recovers_after_transport_errors() -> Result<(), String> {
    run_paused_test(async {
        let refused = TransportError::new(TransportErrorKind::Connect, "connection refused");
        let executor = Arc::new(
            ScriptedExecutor::status(200)
                .script([Step::Fail(refused.clone()), Step::Fail(refused)]),
        );
        let case = health_case("flaky").with_retry(RetryPolicy::new(3, Duration::from_millis(10)));

        let result = runner(&executor).run(&case, &Variables::new()).await;
        if result.status != TestStatus::Passed || result.attempts != 3 {
            return Err(format!(
                "Expected pass on third attempt, got {:?} after {}",
                result.status, result.attempts
            ));
        }
        if result.error.is_some() {
            return Err("A recovered case has no error".to_owned());
        }
        Ok(())
    })
}

#[test]
fn http_errors_are_not_retried() -> Result<(), String> {
    run_paused_test(async {
        let executor = Arc::new(ScriptedExecutor::status(500));
        let case = health_case("500").with_retry(RetryPolicy::new(3, Duration::from_secs(1)));
        let result = runner(&executor).run(&case, &Variables::new()).await;
        if result.attempts != 1 || executor.calls() != 1 {
            return Err(format!("HTTP 500 was retried: {} calls", executor.calls()));
        }
        Ok(())
    })
}

#[test]
fn zero_timeout_uses_runner_default() -> Result<(), String> {
    run_paused_test(async {
        let executor = Arc::new(ScriptedExecutor::new(Step::Hang));
        let runner = runner(&executor).with_default_timeout(Duration::from_secs(2));
        let result = runner.run(&health_case("hang"), &Variables::new()).await;
        if result.duration < Duration::from_secs(2)
            || result.duration > Duration::from_millis(2_100)
        {
            return Err(format!("Expected 2s default timeout, got {:?}", result.duration));
        }
        if runner.effective_timeout(&health_case("x").with_timeout(Duration::from_secs(7)))
            != Duration::from_secs(7)
        {
            return Err("Explicit timeout should win".to_owned());
        }
        Ok(())
    })
}

#[test]
fn disabled_case_is_reported_skipped() -> Result<(), String> {
    run_paused_test(async {
        let executor = Arc::new(ScriptedExecutor::status(200));
        let result = runner(&executor)
            .run(&health_case("off").disabled(), &Variables::new())
            .await;
        if result.status != TestStatus::Skipped || executor.calls() != 0 {
            return Err(format!("Expected skipped without calls, got {:?}", result.status));
        }
        if result.error.is_some() || result.skip_reason.as_deref() != Some("test case is disabled") {
            return Err(format!(
                "Skip reason misplaced: error {:?} skip_reason {:?}",
                result.error, result.skip_reason
            ));
        }
        Ok(())
    })
}

fn suite_executor() -> Arc<ScriptedExecutor> {
    Arc::new(
        ScriptedExecutor::status(200)
            .with_latency(Duration::from_millis(100))
            .route("https://api.example/broken", Step::Respond(500, "")),
    )
}

fn broken_case(id: &str) -> TestCase {
    TestCase::new(id, RequestTemplate::get("https://api.example/broken"))
        .with_assertion(Assertion::status_equals(200))
}

#[test]
fn suite_counts_exclude_disabled_cases() -> Result<(), String> {
    run_paused_test(async {
        let executor = suite_executor();
        let suite = TestSuite::new(
            "mixed",
            vec![
                health_case("a"),
                health_case("b").disabled(),
                broken_case("c"),
            ],
        );
        let result = TestSuiteRunner::new(runner(&executor))
            .run(&suite)
            .await
            .map_err(|err| err.to_string())?;

        if (result.total, result.passed, result.failed, result.skipped, result.disabled)
            != (2, 1, 1, 0, 1)
        {
            return Err(format!(
                "Unexpected counts: total {} passed {} failed {} skipped {} disabled {}",
                result.total, result.passed, result.failed, result.skipped, result.disabled
            ));
        }
        if result.results.len() != result.total || result.status != SuiteStatus::Failed {
            return Err(format!("Unexpected suite status {:?}", result.status));
        }
        if (result.summary.success_rate - 50.0).abs() > f64::EPSILON {
            return Err(format!("Unexpected success rate {}", result.summary.success_rate));
        }
        Ok(())
    })
}

#[test]
fn sequential_suite_runs_in_order() -> Result<(), String> {
    run_paused_test(async {
        let executor = suite_executor();
        let suite = TestSuite::new(
            "ordered",
            vec![health_case("first"), health_case("second"), health_case("third")],
        );
        let result = TestSuiteRunner::new(runner(&executor))
            .run(&suite)
            .await
            .map_err(|err| err.to_string())?;

        let ids: Vec<&str> = result
            .results
            .iter()
            .map(|result| result.test_case_id.as_str())
            .collect();
        if ids != ["first", "second", "third"] {
            return Err(format!("Unexpected order: {:?}", ids));
        }
        for (previous, next) in result.results.iter().zip(result.results.iter().skip(1)) {
            if next.started_at < previous.finished_at {
                return Err("A case started before the previous one finished".to_owned());
            }
        }
        if executor.peak_in_flight() != 1 || result.status != SuiteStatus::Passed {
            return Err(format!("Peak in flight {}", executor.peak_in_flight()));
        }
        Ok(())
    })
}

#[test]
fn parallel_suite_respects_max_concurrency() -> Result<(), String> {
    run_paused_test(async {
        let executor = suite_executor();
        let cases = (0..6).map(|index| health_case(&format!("case-{}", index))).collect();
        let suite = TestSuite::new("wide", cases).parallel(2);

        let result = TestSuiteRunner::new(runner(&executor))
            .run(&suite)
            .await
            .map_err(|err| err.to_string())?;

        if result.total != 6 || result.passed != 6 {
            return Err(format!("Expected 6 passes, got {}", result.passed));
        }
        if executor.peak_in_flight() != 2 {
            return Err(format!(
                "Expected 2 concurrent requests, saw {}",
                executor.peak_in_flight()
            ));
        }
        // Three waves of two 100ms requests.
        if result.duration < Duration::from_millis(300) {
            return Err(format!("Suite finished too fast: {:?}", result.duration));
        }
        if result.summary.total_requests != 6 || result.summary.min_response_time.is_zero() {
            return Err(format!("Unexpected summary: {:?}", result.summary));
        }
        Ok(())
    })
}

#[test]
fn fail_fast_skips_remaining_cases() -> Result<(), String> {
    run_paused_test(async {
        let executor = suite_executor();
        let mut suite = TestSuite::new(
            "halting",
            vec![health_case("a"), broken_case("b"), health_case("c"), health_case("d")],
        );
        suite.fail_fast = true;
        let result = TestSuiteRunner::new(runner(&executor))
            .run(&suite)
            .await
            .map_err(|err| err.to_string())?;

        if (result.passed, result.failed, result.skipped) != (1, 1, 2) {
            return Err(format!(
                "Unexpected counts: passed {} failed {} skipped {}",
                result.passed, result.failed, result.skipped
            ));
        }
        if executor.calls() != 2 {
            return Err(format!("Skipped cases were executed: {} calls", executor.calls()));
        }
        if result.summary.total_requests != 2 {
            return Err("Skipped cases must not enter the summary".to_owned());
        }
        let skipped: Vec<&TestResult> = result
            .results
            .iter()
            .filter(|case| case.status == TestStatus::Skipped)
            .collect();
        let expected = Some(super::suite::FAIL_FAST_REASON);
        if skipped
            .iter()
            .any(|case| case.error.is_some() || case.skip_reason.as_deref() != expected)
        {
            return Err(format!("Fail-fast skips carry the wrong reason: {:?}", skipped));
        }
        Ok(())
    })
}

#[test]
fn parallel_fail_fast_skips_cases_not_yet_admitted() -> Result<(), String> {
    run_paused_test(async {
        let executor = suite_executor();
        let mut suite = TestSuite::new(
            "halting-parallel",
            vec![broken_case("a"), health_case("b"), health_case("c")],
        )
        .parallel(1);
        suite.fail_fast = true;
        let result = TestSuiteRunner::new(runner(&executor))
            .run(&suite)
            .await
            .map_err(|err| err.to_string())?;

        if result.failed != 1 || result.skipped != 2 || result.total != 3 {
            return Err(format!(
                "Unexpected counts: failed {} skipped {}",
                result.failed, result.skipped
            ));
        }
        Ok(())
    })
}

#[test]
fn parallel_suite_rejects_zero_concurrency() -> Result<(), String> {
    run_paused_test(async {
        let executor = suite_executor();
        let suite = TestSuite::new("bad", vec![health_case("a")]).parallel(0);
        match TestSuiteRunner::new(runner(&executor)).run(&suite).await {
            Err(AppError::Validation(ValidationError::ZeroConcurrency { suite })) => {
                if suite != "bad" {
                    return Err(format!("Unexpected suite id {}", suite));
                }
            }
            other => return Err(format!("Expected validation error, got {:?}", other)),
        }
        if executor.calls() != 0 {
            return Err("No work may be dispatched".to_owned());
        }
        Ok(())
    })
}

#[test]
fn empty_suite_is_skipped() -> Result<(), String> {
    run_paused_test(async {
        let executor = suite_executor();
        let suite = TestSuite::new("empty", vec![health_case("off").disabled()]);
        let result = TestSuiteRunner::new(runner(&executor))
            .run(&suite)
            .await
            .map_err(|err| err.to_string())?;
        if result.status != SuiteStatus::Skipped || result.total != 0 || result.disabled != 1 {
            return Err(format!("Unexpected result: {:?}", result.status));
        }
        if result.summary.success_rate.abs() > f64::EPSILON {
            return Err("Empty summary should report zero".to_owned());
        }
        Ok(())
    })
}

#[test]
fn summary_counts_errors_as_failures() -> Result<(), String> {
    run_paused_test(async {
        let refused = TransportError::new(TransportErrorKind::Connect, "connection refused");
        let executor = Arc::new(
            ScriptedExecutor::status(200)
                .with_latency(Duration::from_millis(40))
                .route("https://api.example/down", Step::Fail(refused)),
        );
        let down = TestCase::new("down", RequestTemplate::get("https://api.example/down"));
        let suite = TestSuite::new("errors", vec![health_case("up"), down]);
        let result = TestSuiteRunner::new(runner(&executor))
            .run(&suite)
            .await
            .map_err(|err| err.to_string())?;

        if result.failed != 1 || result.summary.error_count != 1 {
            return Err(format!("Unexpected summary: {:?}", result.summary));
        }
        if (result.summary.success_rate - 50.0).abs() > f64::EPSILON {
            return Err(format!("Unexpected success rate {}", result.summary.success_rate));
        }
        if result.summary.max_response_time != Duration::from_millis(40) {
            return Err(format!(
                "Unexpected max response time {:?}",
                result.summary.max_response_time
            ));
        }
        Ok(())
    })
}
