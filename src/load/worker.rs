use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::domain::{TestCase, TestResult, TestStatus, Variables};
use crate::testing::TestCaseRunner;

use super::live::{ActiveUserGuard, LiveCounters};

/// What a virtual user reports per iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSample {
    pub duration: Duration,
    pub passed: bool,
    pub error: Option<String>,
}

impl From<TestResult> for RequestSample {
    fn from(result: TestResult) -> Self {
        Self {
            duration: result.duration,
            passed: result.status == TestStatus::Passed,
            error: result.error.filter(|message| !message.is_empty()),
        }
    }
}

pub struct VirtualUser {
    pub id: usize,
    pub runner: TestCaseRunner,
    pub case: Arc<TestCase>,
    pub counters: Arc<LiveCounters>,
    pub deadline: Instant,
    pub pacing: Option<Duration>,
}

impl VirtualUser {
    /// Repeats the case until the deadline, checking it before each
    /// iteration. A request already in flight is allowed to finish.
    pub async fn run(self, samples: mpsc::Sender<RequestSample>) -> u64 {
        let _active = ActiveUserGuard::enter(&self.counters);
        let variables = Variables::new();
        let mut iterations: u64 = 0;
        debug!("Virtual user {} started", self.id);

        while Instant::now() < self.deadline {
            let result = self.runner.run(&self.case, &variables).await;
            iterations = iterations.saturating_add(1);
            if samples.send(RequestSample::from(result)).await.is_err() {
                break;
            }
            if let Some(pacing) = self.pacing {
                let wake = Instant::now()
                    .checked_add(pacing)
                    .map_or(self.deadline, |next| next.min(self.deadline));
                sleep_until(wake).await;
            }
        }

        debug!("Virtual user {} finished after {} iteration(s)", self.id, iterations);
        iterations
    }
}
