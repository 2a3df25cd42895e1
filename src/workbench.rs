//! One handle over the three runners, sharing a single request executor.
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    LoadTestConfig, LoadTestResult, TestCase, TestResult, TestSuite, TestSuiteResult, Variables,
};
use crate::error::AppResult;
use crate::http::{RequestExecutor, RequestResolver};
use crate::load::LoadTestEngine;
use crate::monitor::MonitorService;
use crate::testing::{TestCaseRunner, TestSuiteRunner};

#[derive(Clone)]
pub struct Workbench {
    cases: TestCaseRunner,
    executor: Arc<dyn RequestExecutor>,
}

impl Workbench {
    #[must_use]
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self {
            cases: TestCaseRunner::new(Arc::clone(&executor)),
            executor,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn RequestResolver>) -> Self {
        self.cases = self.cases.with_resolver(resolver);
        self
    }

    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.cases = self.cases.with_default_timeout(timeout);
        self
    }

    pub async fn run_test_case(&self, case: &TestCase, variables: &Variables) -> TestResult {
        self.cases.run(case, variables).await
    }

    /// # Errors
    ///
    /// See [`TestSuiteRunner::run`].
    pub async fn run_test_suite(&self, suite: &TestSuite) -> AppResult<TestSuiteResult> {
        TestSuiteRunner::new(self.cases.clone()).run(suite).await
    }

    /// # Errors
    ///
    /// See [`LoadTestEngine::run`].
    pub async fn run_load_test(&self, config: &LoadTestConfig) -> AppResult<LoadTestResult> {
        LoadTestEngine::new(self.cases.clone()).run(config).await
    }

    #[must_use]
    pub fn monitor_service(&self) -> MonitorService {
        MonitorService::new(Arc::clone(&self.executor))
    }
}
