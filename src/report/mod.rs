//! Rendering of run results for the terminal and JSON export.
mod export;
mod text;


use serde::Serialize;

use crate::domain::{
    LoadTestResult, MonitorAlert, MonitorStats, TestResult, TestSuiteResult, UptimeReport,
};

pub use export::{export_json, to_json};
pub use text::render_text;

/// Everything the monitor command has to say about one monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub stats: MonitorStats,
    pub uptime: UptimeReport,
    pub alerts: Vec<MonitorAlert>,
}

/// Output of one CLI command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Suites(Vec<TestSuiteResult>),
    Case(Box<TestResult>),
    Load(Box<LoadTestResult>),
    Monitors(Vec<MonitorReport>),
}
