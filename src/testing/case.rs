use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, warn};

use crate::clock::WallClock;
use crate::domain::{
    HttpResponse, RequestTemplate, TestCase, TestResult, TestStatus, Variables, new_id,
};
use crate::error::TransportError;
use crate::http::{RequestExecutor, RequestResolver, VerbatimResolver};

use super::evaluate_all;

/// Applied when a case leaves its timeout at zero.
pub const DEFAULT_CASE_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes single test cases: timeout, retries, then assertions.
///
/// Cheap to clone; clones share the executor and resolver.
#[derive(Clone)]
pub struct TestCaseRunner {
    executor: Arc<dyn RequestExecutor>,
    resolver: Arc<dyn RequestResolver>,
    default_timeout: Duration,
    clock: WallClock,
}

impl TestCaseRunner {
    #[must_use]
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self {
            executor,
            resolver: Arc::new(VerbatimResolver),
            default_timeout: DEFAULT_CASE_TIMEOUT,
            clock: WallClock::new(),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn RequestResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_default_timeout(mut self, default_timeout: Duration) -> Self {
        self.default_timeout = default_timeout;
        self
    }

    #[must_use]
    pub const fn clock(&self) -> &WallClock {
        &self.clock
    }

    #[must_use]
    pub fn effective_timeout(&self, case: &TestCase) -> Duration {
        if case.timeout.is_zero() {
            self.default_timeout
        } else {
            case.timeout
        }
    }

    /// Runs one case to completion. Never fails: transport problems end up
    /// as an `error` result, unmet assertions as `failed`.
    pub async fn run(&self, case: &TestCase, variables: &Variables) -> TestResult {
        let start = Instant::now();
        let started_at = self.clock.at(start);

        if !case.enabled {
            return TestResult::skipped(case, started_at, "test case is disabled");
        }

        let request_timeout = self.effective_timeout(case);
        let request = self.resolver.resolve(&case.request, variables);
        let max_attempts = case.retry.max_attempts();

        let mut attempts: u32 = 0;
        let mut outcome: Result<HttpResponse, TransportError> =
            Err(TransportError::invalid_request("no attempt was made"));
        while attempts < max_attempts {
            if attempts > 0 && !case.retry.interval.is_zero() {
                sleep(case.retry.interval).await;
            }
            attempts = attempts.saturating_add(1);

            outcome = self.attempt(&request, request_timeout).await;
            match &outcome {
                Ok(_) => break,
                Err(err) => warn!(
                    "Test case '{}' attempt {}/{} failed: {}",
                    case.name, attempts, max_attempts, err
                ),
            }
        }

        let finished = Instant::now();
        let duration = finished.duration_since(start);
        let finished_at = self.clock.at(finished);

        let (status, response, assertions, error) = match outcome {
            Err(err) => (TestStatus::Error, None, Vec::new(), Some(err.to_string())),
            Ok(response) => {
                let assertions = evaluate_all(&case.assertions, &response);
                let status = if assertions.iter().all(|result| result.passed) {
                    TestStatus::Passed
                } else {
                    TestStatus::Failed
                };
                (status, Some(response), assertions, None)
            }
        };
        debug!(
            "Test case '{}' {} after {} attempt(s) in {}ms",
            case.name,
            status.as_str(),
            attempts,
            duration.as_millis()
        );

        TestResult {
            id: new_id(),
            test_case_id: case.id.clone(),
            name: case.name.clone(),
            status,
            started_at,
            finished_at,
            duration,
            attempts,
            response,
            assertions,
            error,
            skip_reason: None,
        }
    }

    /// One transport attempt, bounded by the timeout even if the executor
    /// does not enforce it itself.
    async fn attempt(
        &self,
        request: &RequestTemplate,
        request_timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        match timeout(request_timeout, self.executor.execute(request, request_timeout)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(format!(
                "request timed out after {}ms",
                request_timeout.as_millis()
            ))),
        }
    }
}
