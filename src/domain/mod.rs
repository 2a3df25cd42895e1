//! Result and input records shared by the runners, the load engine and the
//! monitor. Everything here serializes to camelCase JSON with durations as
//! whole milliseconds.
mod assertion;
mod case;
pub mod duration_ms;
mod ids;
mod load;
mod monitor;
mod request;
mod suite;


pub use assertion::{Assertion, AssertionKind, AssertionResult, AssertionValue, Operator};
pub use case::{RetryPolicy, TestCase, TestResult, TestStatus, Variables};
pub use ids::new_id;
pub use load::{DEFAULT_TIMELINE_INTERVAL, LoadTestConfig, LoadTestResult, TimelinePoint};
pub use monitor::{
    AlertKind, AlertSeverity, DowntimeIncident, MonitorAlert, MonitorCheck, MonitorConfig,
    MonitorStats, MonitorStatus, UptimeMetric, UptimePeriod, UptimeReport,
};
pub use request::{HttpMethod, HttpResponse, RequestTemplate};
pub use suite::{ExecutionMode, SuiteStatus, TestSuite, TestSuiteResult, TestSummary};
