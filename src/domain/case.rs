use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Assertion, AssertionResult, HttpResponse, RequestTemplate, duration_ms};

/// Variable bindings shared by every case of a suite.
pub type Variables = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub count: u32,
    /// Pause between attempts; never applied before the first.
    #[serde(with = "duration_ms")]
    pub interval: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(count: u32, interval: Duration) -> Self {
        Self { count, interval }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.count.saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub request: RequestTemplate,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
    #[serde(default)]
    pub pre_script: Option<String>,
    #[serde(default)]
    pub post_script: Option<String>,
    pub enabled: bool,
    /// Zero selects the runner's default timeout.
    #[serde(with = "duration_ms", default)]
    pub timeout: Duration,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl TestCase {
    #[must_use]
    pub fn new(id: impl Into<String>, request: RequestTemplate) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            request,
            assertions: Vec::new(),
            pre_script: None,
            post_script: None,
            enabled: true,
            timeout: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
    Skipped,
}

impl TestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        }
    }

    /// Failed and errored cases both count against a run.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::Error)
    }
}

/// Outcome of one test case execution. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub test_case_id: String,
    pub name: String,
    pub status: TestStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// Transport attempts made, retries included.
    pub attempts: u32,
    pub response: Option<HttpResponse>,
    pub assertions: Vec<AssertionResult>,
    /// Only set when `status` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Only set when `status` is `Skipped`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub skip_reason: Option<String>,
}

impl TestResult {
    /// Result for a case that was never executed.
    #[must_use]
    pub fn skipped(case: &TestCase, at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        let mut result = Self::not_run(case, at, TestStatus::Skipped);
        result.skip_reason = Some(reason.into());
        result
    }

    /// Result for a case whose execution died before it could report.
    #[must_use]
    pub fn aborted(case: &TestCase, at: DateTime<Utc>, message: impl Into<String>) -> Self {
        let mut result = Self::not_run(case, at, TestStatus::Error);
        result.error = Some(message.into());
        result
    }

    fn not_run(case: &TestCase, at: DateTime<Utc>, status: TestStatus) -> Self {
        Self {
            id: super::new_id(),
            test_case_id: case.id.clone(),
            name: case.name.clone(),
            status,
            started_at: at,
            finished_at: at,
            duration: Duration::ZERO,
            attempts: 0,
            response: None,
            assertions: Vec::new(),
            error: None,
            skip_reason: None,
        }
    }
}
