use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{
    ExecutionMode, SuiteStatus, TestCase, TestResult, TestStatus, TestSuite, TestSuiteResult,
    TestSummary, Variables, new_id,
};
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::{rate_percent, summarize};

use super::TestCaseRunner;

pub(super) const FAIL_FAST_REASON: &str = "skipped after an earlier failure (fail_fast)";

/// Runs whole suites on top of a [`TestCaseRunner`].
#[derive(Clone)]
pub struct TestSuiteRunner {
    cases: TestCaseRunner,
}

impl TestSuiteRunner {
    #[must_use]
    pub const fn new(cases: TestCaseRunner) -> Self {
        Self { cases }
    }

    #[must_use]
    pub const fn case_runner(&self) -> &TestCaseRunner {
        &self.cases
    }

    /// Runs every enabled case of `suite` and aggregates the outcome.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the suite is in parallel mode with a
    /// `max_concurrency` of zero. Case failures never surface here; they are
    /// part of the returned result.
    pub async fn run(&self, suite: &TestSuite) -> AppResult<TestSuiteResult> {
        if suite.mode == ExecutionMode::Parallel && suite.max_concurrency == 0 {
            return Err(AppError::validation(ValidationError::ZeroConcurrency {
                suite: suite.id.clone(),
            }));
        }

        let clock = *self.cases.clock();
        let start = Instant::now();
        let started_at = clock.at(start);

        let enabled: Vec<TestCase> = suite
            .tests
            .iter()
            .filter(|case| case.enabled)
            .cloned()
            .collect();
        let disabled = suite.tests.len().saturating_sub(enabled.len());
        info!(
            "Running suite '{}' ({} case(s), {} disabled, {:?} mode)",
            suite.name,
            enabled.len(),
            disabled,
            suite.mode
        );

        let results = match suite.mode {
            ExecutionMode::Sequential => self.run_sequential(suite, &enabled).await,
            ExecutionMode::Parallel => self.run_parallel(suite, &enabled).await,
        };

        let finished = Instant::now();
        let mut passed: usize = 0;
        let mut failed: usize = 0;
        let mut skipped: usize = 0;
        for result in &results {
            match result.status {
                TestStatus::Passed => passed = passed.saturating_add(1),
                TestStatus::Failed | TestStatus::Error => failed = failed.saturating_add(1),
                TestStatus::Skipped => skipped = skipped.saturating_add(1),
            }
        }
        let status = if failed > 0 {
            SuiteStatus::Failed
        } else if passed > 0 {
            SuiteStatus::Passed
        } else {
            SuiteStatus::Skipped
        };
        let summary = summarize_results(&results);
        info!(
            "Suite '{}' {}: {} passed, {} failed, {} skipped",
            suite.name,
            status.as_str(),
            passed,
            failed,
            skipped
        );

        Ok(TestSuiteResult {
            id: new_id(),
            suite_id: suite.id.clone(),
            name: suite.name.clone(),
            status,
            started_at,
            finished_at: clock.at(finished),
            duration: finished.duration_since(start),
            total: results.len(),
            passed,
            failed,
            skipped,
            disabled,
            results,
            summary,
        })
    }

    async fn run_sequential(&self, suite: &TestSuite, cases: &[TestCase]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(cases.len());
        let mut halted = false;
        for case in cases {
            if halted {
                results.push(TestResult::skipped(
                    case,
                    self.cases.clock().now(),
                    FAIL_FAST_REASON,
                ));
                continue;
            }
            let result = self.cases.run(case, &suite.variables).await;
            if suite.fail_fast && result.status.is_failure() {
                debug!("Suite '{}' halted by '{}'", suite.name, case.name);
                halted = true;
            }
            results.push(result);
        }
        results
    }

    async fn run_parallel(&self, suite: &TestSuite, cases: &[TestCase]) -> Vec<TestResult> {
        let expected = cases.len();
        let semaphore = Arc::new(Semaphore::new(suite.max_concurrency.min(Semaphore::MAX_PERMITS)));
        let halted = Arc::new(AtomicBool::new(false));
        let variables: Arc<Variables> = Arc::new(suite.variables.clone());
        let (tx, mut rx) = mpsc::channel::<(usize, TestResult)>(expected.max(1));

        let mut slots: Vec<Option<TestResult>> = Vec::with_capacity(expected);
        let mut handles = Vec::with_capacity(expected);
        for (index, case) in cases.iter().enumerate() {
            slots.push(None);
            let runner = self.cases.clone();
            let semaphore = Arc::clone(&semaphore);
            let halted = Arc::clone(&halted);
            let variables = Arc::clone(&variables);
            let tx = tx.clone();
            let case = case.clone();
            let fail_fast = suite.fail_fast;
            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let result = if halted.load(Ordering::Acquire) {
                    TestResult::skipped(&case, runner.clock().now(), FAIL_FAST_REASON)
                } else {
                    let result = runner.run(&case, &variables).await;
                    if fail_fast && result.status.is_failure() {
                        halted.store(true, Ordering::Release);
                    }
                    result
                };
                if tx.send((index, result)).await.is_err() {
                    debug!("Suite collector closed before case {} reported", index);
                }
            }));
        }
        drop(tx);

        while let Some((index, result)) = rx.recv().await {
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }
        for handle in handles {
            if let Err(err) = handle.await {
                warn!("Suite '{}' case task failed: {}", suite.name, err);
            }
        }

        // A task that died before reporting still owes its case a result.
        let clock = *self.cases.clock();
        slots
            .into_iter()
            .zip(cases.iter())
            .map(|(slot, case)| {
                slot.unwrap_or_else(|| TestResult::aborted(case, clock.now(), "case task aborted"))
            })
            .collect()
    }
}

/// Summary statistics over the cases that actually ran.
///
/// Skipped results are excluded; errors count as executed but not passed.
#[must_use]
pub fn summarize_results(results: &[TestResult]) -> TestSummary {
    let executed: Vec<&TestResult> = results
        .iter()
        .filter(|result| result.status != TestStatus::Skipped)
        .collect();
    let durations: Vec<Duration> = executed.iter().map(|result| result.duration).collect();
    let latency = summarize(&durations);
    let passed = executed
        .iter()
        .filter(|result| result.status == TestStatus::Passed)
        .count();
    let error_count = executed
        .iter()
        .filter(|result| result.status == TestStatus::Error)
        .count();

    TestSummary {
        avg_response_time: latency.avg,
        min_response_time: latency.min,
        max_response_time: latency.max,
        success_rate: rate_percent(
            u64::try_from(passed).unwrap_or(u64::MAX),
            u64::try_from(executed.len()).unwrap_or(u64::MAX),
        ),
        total_requests: executed.len(),
        error_count,
    }
}
