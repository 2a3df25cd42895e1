use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TestCase, duration_ms};

pub const DEFAULT_TIMELINE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTestConfig {
    pub test_case: TestCase,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    #[serde(with = "duration_ms", default)]
    pub ramp_up: Duration,
    pub max_users: usize,
    /// Iterations per second for each virtual user; zero means unpaced.
    #[serde(default)]
    pub requests_per_sec: u32,
    #[serde(with = "duration_ms", default = "default_timeline_interval")]
    pub timeline_interval: Duration,
}

const fn default_timeline_interval() -> Duration {
    DEFAULT_TIMELINE_INTERVAL
}

impl LoadTestConfig {
    #[must_use]
    pub const fn new(test_case: TestCase, duration: Duration, max_users: usize) -> Self {
        Self {
            test_case,
            duration,
            ramp_up: Duration::ZERO,
            max_users,
            requests_per_sec: 0,
            timeline_interval: DEFAULT_TIMELINE_INTERVAL,
        }
    }

    /// Pause a virtual user takes between iterations, if paced.
    #[must_use]
    pub fn pacing(&self) -> Option<Duration> {
        if self.requests_per_sec == 0 {
            return None;
        }
        Duration::from_secs(1).checked_div(self.requests_per_sec)
    }
}

/// One periodic snapshot of a running load test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    pub active_users: usize,
    pub requests_per_sec: f64,
    #[serde(with = "duration_ms")]
    pub avg_response_time: Duration,
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTestResult {
    pub config: LoadTestConfig,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    #[serde(with = "duration_ms")]
    pub avg_response_time: Duration,
    #[serde(with = "duration_ms")]
    pub min_response_time: Duration,
    #[serde(with = "duration_ms")]
    pub max_response_time: Duration,
    #[serde(with = "duration_ms")]
    pub p95_response_time: Duration,
    #[serde(with = "duration_ms")]
    pub p99_response_time: Duration,
    pub requests_per_sec: f64,
    /// Failed share of all requests, in percent.
    pub error_rate: f64,
    pub errors: BTreeMap<String, u64>,
    pub timeline: Vec<TimelinePoint>,
    /// Highest number of virtual users active at once.
    pub peak_users: usize,
}
