use super::*;
use crate::domain::{Assertion, LoadTestConfig, RequestTemplate, TestCase};
use crate::error::{AppError, TransportError, TransportErrorKind, ValidationError};
use crate::test_support::{ScriptedExecutor, Step, run_paused_test};
use crate::testing::TestCaseRunner;
use std::sync::Arc;
use std::time::Duration;

fn health_case() -> TestCase {
    TestCase::new("health", RequestTemplate::get("https://api.example/health"))
        .with_assertion(Assertion::status_equals(200))
}

fn engine(executor: &Arc<ScriptedExecutor>) -> LoadTestEngine {
    LoadTestEngine::new(TestCaseRunner::new(executor.clone()))
}

fn config(max_users: usize, duration: Duration, requests_per_sec: u32) -> LoadTestConfig {
    let mut config = LoadTestConfig::new(health_case(), duration, max_users);
    config.requests_per_sec = requests_per_sec;
    config
}

fn steps(schedule: RampSchedule) -> Vec<(u64, usize)> {
    schedule
        .map(|step| (u64::try_from(step.at.as_millis()).unwrap_or(u64::MAX), step.spawn))
        .collect()
}

#[test]
fn ramp_carries_fractional_users_between_ticks() -> Result<(), String> {
    let batches = steps(RampSchedule::new(5, Duration::from_secs(2)));
    if batches != [(1_000, 2), (2_000, 3)] {
        return Err(format!("Unexpected batches: {:?}", batches));
    }
    Ok(())
}

#[test]
fn ramp_ends_exactly_at_ramp_up() -> Result<(), String> {
    let batches = steps(RampSchedule::new(3, Duration::from_millis(2_500)));
    if batches != [(1_000, 1), (2_000, 1), (2_500, 1)] {
        return Err(format!("Unexpected batches: {:?}", batches));
    }

    let linear = steps(RampSchedule::new(10, Duration::from_secs(10)));
    let total: usize = linear.iter().map(|(_, spawn)| spawn).sum();
    if total != 10 || linear.last() != Some(&(10_000, 1)) {
        return Err(format!("Unexpected linear ramp: {:?}", linear));
    }
    Ok(())
}

#[test]
fn ramp_without_duration_starts_everyone_at_once() -> Result<(), String> {
    let batches = steps(RampSchedule::new(4, Duration::ZERO));
    if batches != [(0, 4)] {
        return Err(format!("Unexpected batches: {:?}", batches));
    }
    if RampSchedule::new(0, Duration::from_secs(5)).next().is_some() {
        return Err("Zero users must not produce steps".to_owned());
    }
    Ok(())
}

#[test]
fn ramp_slower_than_a_user_per_tick() -> Result<(), String> {
    let batches = steps(RampSchedule::new(2, Duration::from_secs(5)));
    if batches != [(3_000, 1), (5_000, 1)] {
        return Err(format!("Unexpected batches: {:?}", batches));
    }
    Ok(())
}

#[test]
fn paced_users_hit_expected_request_count() -> Result<(), String> {
    run_paused_test(async {
        let executor =
            Arc::new(ScriptedExecutor::status(200).with_latency(Duration::from_millis(50)));
        let result = engine(&executor)
            .run(&config(5, Duration::from_secs(3), 1))
            .await
            .map_err(|err| err.to_string())?;

        if !(14..=16).contains(&result.total_requests) {
            return Err(format!("Expected about 15 requests, got {}", result.total_requests));
        }
        if result.successful_requests + result.failed_requests != result.total_requests {
            return Err("Success and failure counts do not add up".to_owned());
        }
        let avg = result.avg_response_time;
        if avg < Duration::from_millis(40) || avg > Duration::from_millis(60) {
            return Err(format!("Unexpected average response time {:?}", avg));
        }
        if usize::try_from(result.total_requests).ok() != Some(executor.calls()) {
            return Err("Every iteration must be counted".to_owned());
        }
        if result.peak_users != 5 || result.error_rate.abs() > f64::EPSILON {
            return Err(format!(
                "Unexpected peak {} or error rate {}",
                result.peak_users, result.error_rate
            ));
        }
        Ok(())
    })
}

#[test]
fn ramp_up_never_exceeds_max_users() -> Result<(), String> {
    run_paused_test(async {
        let executor =
            Arc::new(ScriptedExecutor::status(200).with_latency(Duration::from_millis(10)));
        let mut load = config(10, Duration::from_secs(12), 1);
        load.ramp_up = Duration::from_secs(10);
        load.timeline_interval = Duration::from_millis(2_500);

        let result = engine(&executor)
            .run(&load)
            .await
            .map_err(|err| err.to_string())?;

        if result.peak_users != 10 {
            return Err(format!("Expected 10 users at peak, got {}", result.peak_users));
        }
        let active: Vec<usize> = result.timeline.iter().map(|point| point.active_users).collect();
        if active.len() != 4 || active.iter().any(|users| *users > 10) {
            return Err(format!("Unexpected timeline users: {:?}", active));
        }
        if active.first() != Some(&2) || active.get(2) != Some(&7) {
            return Err(format!("Ramp did not grow linearly: {:?}", active));
        }
        Ok(())
    })
}

#[test]
fn timeline_points_follow_the_interval() -> Result<(), String> {
    run_paused_test(async {
        let executor =
            Arc::new(ScriptedExecutor::status(200).with_latency(Duration::from_millis(10)));
        let result = engine(&executor)
            .run(&config(2, Duration::from_secs(12), 2))
            .await
            .map_err(|err| err.to_string())?;

        let elapsed: Vec<Duration> = result.timeline.iter().map(|point| point.elapsed).collect();
        if elapsed != [Duration::from_secs(5), Duration::from_secs(10)] {
            return Err(format!("Unexpected timeline offsets: {:?}", elapsed));
        }
        for point in &result.timeline {
            if point.requests_per_sec <= 0.0 || point.active_users != 2 {
                return Err(format!("Unexpected point: {:?}", point));
            }
        }
        if result
            .timeline
            .iter()
            .zip(result.timeline.iter().skip(1))
            .any(|(earlier, later)| later.timestamp <= earlier.timestamp)
        {
            return Err("Timeline timestamps must increase".to_owned());
        }
        Ok(())
    })
}

#[test]
fn transport_errors_are_tallied_by_message() -> Result<(), String> {
    run_paused_test(async {
        let refused = TransportError::new(TransportErrorKind::Connect, "connection refused");
        let executor = Arc::new(
            ScriptedExecutor::new(Step::Fail(refused)).with_latency(Duration::from_millis(10)),
        );
        let result = engine(&executor)
            .run(&config(1, Duration::from_secs(3), 1))
            .await
            .map_err(|err| err.to_string())?;

        if result.failed_requests != 3 || result.successful_requests != 0 {
            return Err(format!("Unexpected counts: {:?}", result.failed_requests));
        }
        if result.errors.get("connect error: connection refused") != Some(&3) {
            return Err(format!("Unexpected error tally: {:?}", result.errors));
        }
        if (result.error_rate - 100.0).abs() > f64::EPSILON {
            return Err(format!("Unexpected error rate {}", result.error_rate));
        }
        Ok(())
    })
}

#[test]
fn assertion_failures_count_without_error_messages() -> Result<(), String> {
    run_paused_test(async {
        let executor =
            Arc::new(ScriptedExecutor::status(500).with_latency(Duration::from_millis(10)));
        let result = engine(&executor)
            .run(&config(1, Duration::from_secs(2), 1))
            .await
            .map_err(|err| err.to_string())?;

        if result.failed_requests != 2 || !result.errors.is_empty() {
            return Err(format!(
                "Unexpected failures {} / errors {:?}",
                result.failed_requests, result.errors
            ));
        }
        Ok(())
    })
}

#[test]
fn percentiles_are_observed_values() -> Result<(), String> {
    run_paused_test(async {
        let executor =
            Arc::new(ScriptedExecutor::status(200).with_latency(Duration::from_millis(30)));
        let mut load = config(3, Duration::from_secs(2), 0);
        load.ramp_up = Duration::from_secs(1);
        let result = engine(&executor)
            .run(&load)
            .await
            .map_err(|err| err.to_string())?;

        if result.total_requests == 0 {
            return Err("Expected requests".to_owned());
        }
        let (p95, p99) = (result.p95_response_time, result.p99_response_time);
        if p95 > p99 || p95 < result.min_response_time || p99 > result.max_response_time {
            return Err(format!(
                "Percentiles out of range: p95 {:?} p99 {:?} min {:?} max {:?}",
                p95, p99, result.min_response_time, result.max_response_time
            ));
        }
        Ok(())
    })
}

#[test]
fn no_users_returns_empty_result() -> Result<(), String> {
    run_paused_test(async {
        let executor = Arc::new(ScriptedExecutor::status(200));
        let engine = engine(&executor);

        let empty = engine
            .run(&config(0, Duration::from_secs(5), 1))
            .await
            .map_err(|err| err.to_string())?;
        let mut disabled = config(3, Duration::from_secs(5), 1);
        disabled.test_case = health_case().disabled();
        let skipped = engine
            .run(&disabled)
            .await
            .map_err(|err| err.to_string())?;

        for result in [&empty, &skipped] {
            if result.total_requests != 0 || !result.timeline.is_empty() {
                return Err(format!("Expected empty result, got {:?}", result.total_requests));
            }
        }
        if executor.calls() != 0 {
            return Err("No request may be sent".to_owned());
        }
        Ok(())
    })
}

#[test]
fn zero_timeline_interval_is_rejected() -> Result<(), String> {
    run_paused_test(async {
        let executor = Arc::new(ScriptedExecutor::status(200));
        let mut load = config(1, Duration::from_secs(1), 1);
        load.timeline_interval = Duration::ZERO;
        match engine(&executor).run(&load).await {
            Err(AppError::Validation(ValidationError::ZeroTimelineInterval)) => Ok(()),
            other => Err(format!(
                "Expected validation error, got {:?}",
                other.map(|result| result.total_requests)
            )),
        }
    })
}

#[test]
fn user_guard_tracks_active_and_peak() -> Result<(), String> {
    let counters = LiveCounters::new();
    {
        let _first = ActiveUserGuard::enter(&counters);
        let _second = ActiveUserGuard::enter(&counters);
        if counters.active_users() != 2 {
            return Err(format!("Expected 2 active, got {}", counters.active_users()));
        }
    }
    counters.record(Duration::from_millis(10), false);
    counters.record(Duration::from_millis(30), true);
    let snapshot = counters.snapshot();
    if counters.active_users() != 0 || counters.peak_users() != 2 {
        return Err("Guards must release on drop".to_owned());
    }
    if snapshot.avg_response_time != Duration::from_millis(20) || snapshot.failed_requests != 1 {
        return Err(format!("Unexpected snapshot: {:?}", snapshot));
    }
    Ok(())
}
