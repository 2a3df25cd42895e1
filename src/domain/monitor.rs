use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RequestTemplate, duration_ms};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub id: String,
    pub name: String,
    pub request: RequestTemplate,
    #[serde(with = "duration_ms")]
    pub interval: Duration,
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Responses slower than this raise a slow-response alert.
    #[serde(with = "duration_ms")]
    pub slow_threshold: Duration,
    pub enabled: bool,
}

impl MonitorConfig {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    #[must_use]
    pub fn new(id: impl Into<String>, request: RequestTemplate) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            request,
            interval: Self::DEFAULT_INTERVAL,
            timeout: Self::DEFAULT_TIMEOUT,
            slow_threshold: Self::DEFAULT_TIMEOUT.checked_div(2).unwrap_or(Duration::ZERO),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorCheck {
    pub checked_at: DateTime<Utc>,
    pub status_code: Option<u16>,
    #[serde(with = "duration_ms")]
    pub response_time: Duration,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Up,
    Degraded,
    Down,
    Unknown,
}

impl MonitorStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MonitorStatus::Up => "up",
            MonitorStatus::Degraded => "degraded",
            MonitorStatus::Down => "down",
            MonitorStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStats {
    pub monitor_id: String,
    pub total_checks: u64,
    pub successful_checks: u64,
    pub failed_checks: u64,
    #[serde(with = "duration_ms")]
    pub avg_response_time: Duration,
    /// Successful share of all checks, in percent.
    pub uptime: f64,
    pub last_check: Option<DateTime<Utc>>,
    pub status: MonitorStatus,
    /// Newest first.
    pub recent_checks: Vec<MonitorCheck>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Downtime,
    SlowResponse,
    ErrorRate,
}

impl AlertKind {
    #[must_use]
    pub const fn severity(self) -> AlertSeverity {
        match self {
            AlertKind::Downtime => AlertSeverity::Critical,
            AlertKind::SlowResponse => AlertSeverity::Medium,
            AlertKind::ErrorRate => AlertSeverity::High,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AlertKind::Downtime => "downtime",
            AlertKind::SlowResponse => "slow_response",
            AlertKind::ErrorRate => "error_rate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorAlert {
    pub id: String,
    pub monitor_id: String,
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
    pub triggered_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl MonitorAlert {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UptimePeriod {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl UptimePeriod {
    /// Parses `24h`, `7d` or `30d`; anything else falls back to a day.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "7d" => UptimePeriod::Week,
            "30d" => UptimePeriod::Month,
            _ => UptimePeriod::Day,
        }
    }

    #[must_use]
    pub const fn window(self) -> Duration {
        match self {
            UptimePeriod::Day => Duration::from_secs(24 * 60 * 60),
            UptimePeriod::Week => Duration::from_secs(7 * 24 * 60 * 60),
            UptimePeriod::Month => Duration::from_secs(30 * 24 * 60 * 60),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UptimePeriod::Day => "24h",
            UptimePeriod::Week => "7d",
            UptimePeriod::Month => "30d",
        }
    }
}

impl fmt::Display for UptimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeIncident {
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub reason: String,
    pub ongoing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeMetric {
    pub timestamp: DateTime<Utc>,
    pub status_code: Option<u16>,
    #[serde(with = "duration_ms")]
    pub response_time: Duration,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeReport {
    pub monitor_id: String,
    pub period: UptimePeriod,
    pub overall_uptime: f64,
    pub total_checks: u64,
    pub incidents: Vec<DowntimeIncident>,
    pub metrics: Vec<UptimeMetric>,
}
