use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::domain::{LoadTestConfig, LoadTestResult};
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::{percentile, rate_percent, summarize};
use crate::testing::TestCaseRunner;

use super::live::LiveCounters;
use super::ramp::{RAMP_TICK, RampSchedule};
use super::timeline::sample_timeline;
use super::worker::{RequestSample, VirtualUser};

/// Buffered samples per virtual user before workers wait on the aggregator.
const SAMPLES_PER_USER: usize = 10;
const MAX_SAMPLE_BUFFER: usize = 65_536;

/// Drives virtual users against one test case for a fixed duration.
#[derive(Clone)]
pub struct LoadTestEngine {
    cases: TestCaseRunner,
    ramp_tick: Duration,
}

impl LoadTestEngine {
    #[must_use]
    pub const fn new(cases: TestCaseRunner) -> Self {
        Self {
            cases,
            ramp_tick: RAMP_TICK,
        }
    }

    /// Runs the load test and aggregates every iteration.
    ///
    /// # Errors
    ///
    /// Rejects a zero timeline interval or a ramp-up too long to schedule.
    /// Request failures are counted in the result, never returned.
    pub async fn run(&self, config: &LoadTestConfig) -> AppResult<LoadTestResult> {
        validate(config)?;

        let clock = *self.cases.clock();
        let start = Instant::now();
        if config.max_users == 0 || config.duration.is_zero() || !config.test_case.enabled {
            info!("Load test has no work to do; returning an empty result");
            return Ok(empty_result(config, clock.at(start)));
        }
        let deadline = start
            .checked_add(config.duration)
            .ok_or_else(|| {
                AppError::validation(ValidationError::InvalidDuration {
                    value: format!("{}ms", config.duration.as_millis()),
                    message: "duration overflows the clock".to_owned(),
                })
            })?;
        info!(
            "Starting load test of '{}': {} user(s), {}s, ramp-up {}s",
            config.test_case.name,
            config.max_users,
            config.duration.as_secs(),
            config.ramp_up.as_secs()
        );

        let counters = LiveCounters::new();
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
        let sampler = tokio::spawn(sample_timeline(
            Arc::clone(&counters),
            clock,
            start,
            deadline,
            config.timeline_interval,
            shutdown_rx,
        ));

        let capacity = config
            .max_users
            .saturating_mul(SAMPLES_PER_USER)
            .clamp(1, MAX_SAMPLE_BUFFER);
        let (tx, mut rx) = mpsc::channel::<RequestSample>(capacity);
        let spawner = self.spawn_users(config, Arc::clone(&counters), start, deadline, tx);

        let mut durations: Vec<Duration> = Vec::new();
        let mut successful: u64 = 0;
        let mut failed: u64 = 0;
        let mut errors: BTreeMap<String, u64> = BTreeMap::new();
        while let Some(sample) = rx.recv().await {
            counters.record(sample.duration, !sample.passed);
            durations.push(sample.duration);
            if sample.passed {
                successful = successful.saturating_add(1);
            } else {
                failed = failed.saturating_add(1);
                if let Some(message) = sample.error {
                    let count = errors.entry(message).or_insert(0);
                    *count = count.saturating_add(1);
                }
            }
        }

        let finished = Instant::now();
        if shutdown_tx.send(()).is_err() {
            debug!("Timeline sampler already stopped");
        }
        let timeline = sampler.await?;
        let spawned = spawner.await?;

        let elapsed = finished.duration_since(start);
        let total = successful.saturating_add(failed);
        let latency = summarize(&durations);
        durations.sort_unstable();
        let requests_per_sec = if elapsed.is_zero() {
            0.0
        } else {
            total as f64 / elapsed.as_secs_f64()
        };

        info!(
            "Load test finished: {} request(s) from {} user(s), {} failed",
            total, spawned, failed
        );
        Ok(LoadTestResult {
            config: config.clone(),
            started_at: clock.at(start),
            finished_at: clock.at(finished),
            elapsed,
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            avg_response_time: latency.avg,
            min_response_time: latency.min,
            max_response_time: latency.max,
            p95_response_time: percentile(&durations, 95),
            p99_response_time: percentile(&durations, 99),
            requests_per_sec,
            error_rate: rate_percent(failed, total),
            errors,
            timeline,
            peak_users: counters.peak_users(),
        })
    }

    /// Starts users along the ramp schedule, never at or after the deadline.
    /// Resolves to the number of users started.
    fn spawn_users(
        &self,
        config: &LoadTestConfig,
        counters: Arc<LiveCounters>,
        start: Instant,
        deadline: Instant,
        samples: mpsc::Sender<RequestSample>,
    ) -> JoinHandle<usize> {
        let schedule = RampSchedule::with_tick(config.max_users, config.ramp_up, self.ramp_tick);
        let runner = self.cases.clone();
        let case = Arc::new(config.test_case.clone());
        let pacing = config.pacing();

        tokio::spawn(async move {
            let mut spawned: usize = 0;
            for step in schedule {
                let Some(at) = start.checked_add(step.at) else {
                    break;
                };
                if at >= deadline {
                    break;
                }
                sleep_until(at).await;
                debug!("Ramp-up: starting {} user(s) at {:?}", step.spawn, step.at);
                for _ in 0..step.spawn {
                    let user = VirtualUser {
                        id: spawned,
                        runner: runner.clone(),
                        case: Arc::clone(&case),
                        counters: Arc::clone(&counters),
                        deadline,
                        pacing,
                    };
                    tokio::spawn(user.run(samples.clone()));
                    spawned = spawned.saturating_add(1);
                }
            }
            if spawned == 0 {
                warn!("Load test ended before any virtual user started");
            }
            spawned
        })
    }
}

fn validate(config: &LoadTestConfig) -> Result<(), ValidationError> {
    if config.timeline_interval.is_zero() {
        return Err(ValidationError::ZeroTimelineInterval);
    }
    if config.ramp_up.as_secs() > u64::from(u32::MAX) {
        return Err(ValidationError::RampUpTooLong {
            ramp_up_ms: config.ramp_up.as_millis(),
        });
    }
    Ok(())
}

fn empty_result(config: &LoadTestConfig, at: chrono::DateTime<chrono::Utc>) -> LoadTestResult {
    LoadTestResult {
        config: config.clone(),
        started_at: at,
        finished_at: at,
        elapsed: Duration::ZERO,
        total_requests: 0,
        successful_requests: 0,
        failed_requests: 0,
        avg_response_time: Duration::ZERO,
        min_response_time: Duration::ZERO,
        max_response_time: Duration::ZERO,
        p95_response_time: Duration::ZERO,
        p99_response_time: Duration::ZERO,
        requests_per_sec: 0.0,
        error_rate: 0.0,
        errors: BTreeMap::new(),
        timeline: Vec::new(),
        peak_users: 0,
    }
}
