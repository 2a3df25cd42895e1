use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TestCase, TestResult, Variables, duration_ms};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub id: String,
    pub name: String,
    pub tests: Vec<TestCase>,
    #[serde(default)]
    pub variables: Variables,
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Admission limit for parallel mode; ignored when sequential.
    #[serde(default)]
    pub max_concurrency: usize,
    /// Once a case fails, report the cases not yet started as skipped.
    #[serde(default)]
    pub fail_fast: bool,
}

impl TestSuite {
    #[must_use]
    pub fn new(id: impl Into<String>, tests: Vec<TestCase>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            tests,
            variables: Variables::new(),
            mode: ExecutionMode::Sequential,
            max_concurrency: 0,
            fail_fast: false,
        }
    }

    #[must_use]
    pub fn parallel(mut self, max_concurrency: usize) -> Self {
        self.mode = ExecutionMode::Parallel;
        self.max_concurrency = max_concurrency;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteStatus {
    Passed,
    Failed,
    Skipped,
}

impl SuiteStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SuiteStatus::Passed => "passed",
            SuiteStatus::Failed => "failed",
            SuiteStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    #[serde(with = "duration_ms")]
    pub avg_response_time: Duration,
    #[serde(with = "duration_ms")]
    pub min_response_time: Duration,
    #[serde(with = "duration_ms")]
    pub max_response_time: Duration,
    /// Percentage of executed cases that passed.
    pub success_rate: f64,
    pub total_requests: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteResult {
    pub id: String,
    pub suite_id: String,
    pub name: String,
    pub status: SuiteStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// Enabled cases; `passed + failed + skipped == total`.
    pub total: usize,
    pub passed: usize,
    /// Includes cases that ended in a transport error.
    pub failed: usize,
    pub skipped: usize,
    /// Disabled cases, not part of `total`.
    pub disabled: usize,
    pub results: Vec<TestResult>,
    pub summary: TestSummary,
}
